//! Identity and network configuration features.

use std::net::Ipv4Addr;

use specbus_core::interfaces::{Ipv4Protocol, SerialNumberProtocol};
use specbus_core::{Bus, FeatureImpl, Protocol};
use specbus_errors::{FeatureError, FeatureResult};

#[derive(Debug)]
pub struct SerialNumberFeature {
    helpers: FeatureImpl<dyn SerialNumberProtocol>,
}

impl SerialNumberFeature {
    pub fn new(helpers: Vec<Box<dyn SerialNumberProtocol>>) -> Self {
        Self {
            helpers: FeatureImpl::new("serial_number", helpers),
        }
    }

    pub fn serial_number(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<String> {
        self.helpers.dispatch(protocol, "serial_number", |h| h.serial_number(bus))
    }
}

#[derive(Debug)]
pub struct NetworkConfigurationFeature {
    helpers: FeatureImpl<dyn Ipv4Protocol>,
}

impl NetworkConfigurationFeature {
    pub fn new(helpers: Vec<Box<dyn Ipv4Protocol>>) -> Self {
        Self {
            helpers: FeatureImpl::new("network_configuration", helpers),
        }
    }

    pub fn dhcp_enabled(&self, protocol: &Protocol, bus: &mut dyn Bus, interface: u8) -> FeatureResult<bool> {
        self.helpers
            .dispatch(protocol, "dhcp_enabled", |h| h.dhcp_enabled(bus, interface))
    }

    pub fn set_dhcp_enabled(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        interface: u8,
        enable: bool,
    ) -> FeatureResult<()> {
        self.helpers.dispatch(protocol, "set_dhcp_enabled", |h| {
            h.set_dhcp_enabled(bus, interface, enable)
        })
    }

    pub fn address(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        interface: u8,
    ) -> FeatureResult<(Ipv4Addr, u8)> {
        self.helpers.dispatch(protocol, "address", |h| h.address(bus, interface))
    }

    pub fn set_address(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        interface: u8,
        address: Ipv4Addr,
        prefix: u8,
    ) -> FeatureResult<()> {
        if prefix > 32 {
            return Err(FeatureError::illegal_argument(
                "prefix",
                prefix,
                "IPv4 prefix length is at most 32",
            ));
        }
        self.helpers.dispatch(protocol, "set_address", |h| {
            h.set_address(bus, interface, address, prefix)
        })
    }
}
