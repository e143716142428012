//! Identity and network configuration.

use std::net::Ipv4Addr;

use specbus_errors::ProtocolResult;

use crate::bus::Bus;
use crate::protocol::ProtocolHelper;

pub trait SerialNumberProtocol: ProtocolHelper {
    fn serial_number(&self, bus: &mut dyn Bus) -> ProtocolResult<String>;
}

/// IPv4 settings of one network interface.
pub trait Ipv4Protocol: ProtocolHelper {
    fn dhcp_enabled(&self, bus: &mut dyn Bus, interface: u8) -> ProtocolResult<bool>;

    fn set_dhcp_enabled(&self, bus: &mut dyn Bus, interface: u8, enable: bool)
    -> ProtocolResult<()>;

    /// Address and prefix length.
    fn address(&self, bus: &mut dyn Bus, interface: u8) -> ProtocolResult<(Ipv4Addr, u8)>;

    fn set_address(
        &self,
        bus: &mut dyn Bus,
        interface: u8,
        address: Ipv4Addr,
        prefix: u8,
    ) -> ProtocolResult<()>;
}
