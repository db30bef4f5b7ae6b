//! Transport address string assembly.
//!
//! The transport owns the address grammar; this module only composes the
//! documented key/value attributes from the controller identity and the
//! tag's own name and type. A ControlLogix tag comes out as, e.g.:
//!
//! ```text
//! protocol=ab_eip&gateway=10.0.0.1&path=1,0&cpu=lgx&elem_size=4&elem_count=1&name=Speed
//! ```
//!
//! Families that take no routing path simply omit the `path=` attribute.

use crate::cpu::CpuFamily;
use crate::data_type::DataType;

/// Composes the transport address for one tag.
pub(crate) fn tag_address(
    gateway: &str,
    path: Option<&str>,
    cpu: CpuFamily,
    name: &str,
    data_type: DataType,
) -> String {
    let mut address = format!("protocol=ab_eip&gateway={gateway}");
    if let Some(path) = path {
        address.push_str("&path=");
        address.push_str(path);
    }
    address.push_str("&cpu=");
    address.push_str(cpu.address_token());
    address.push_str(&format!(
        "&elem_size={}&elem_count=1&name={name}",
        data_type.elem_size()
    ));
    address
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logix_address_includes_path() {
        let addr = tag_address(
            "10.0.0.1",
            Some("1,0"),
            CpuFamily::ControlLogix,
            "Speed",
            DataType::Dint,
        );
        assert_eq!(
            addr,
            "protocol=ab_eip&gateway=10.0.0.1&path=1,0&cpu=lgx&elem_size=4&elem_count=1&name=Speed"
        );
    }

    #[test]
    fn test_slc_address_omits_path() {
        let addr = tag_address("192.168.1.9", None, CpuFamily::Slc500, "N7:0", DataType::Int);
        assert_eq!(
            addr,
            "protocol=ab_eip&gateway=192.168.1.9&cpu=slc500&elem_size=2&elem_count=1&name=N7:0"
        );
    }
}
