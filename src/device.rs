use derive_more::{Display, From};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::variant::{Enumerant, VariantError};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Enumerant)]
#[enumerant(crate = "crate")]
pub enum DeviceType {
    #[default]
    Cpu = 0,
    #[enumerant(alias = "gpu")]
    Cuda = 1,
}

/// Where a tensor lives. Only the kind of device for now; a device index (which GPU) would go here.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, From)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
#[display("{device_type}")]
pub struct Device {
    device_type: DeviceType,
}

impl Device {
    pub const CPU: Self = Self::new(DeviceType::Cpu);
    pub const CUDA: Self = Self::new(DeviceType::Cuda);

    #[inline]
    pub const fn new(device_type: DeviceType) -> Self {
        Self { device_type }
    }

    #[inline]
    pub const fn device_type(self) -> DeviceType {
        self.device_type
    }

    #[inline]
    pub const fn is_cpu(self) -> bool {
        matches!(self.device_type, DeviceType::Cpu)
    }
}

impl std::str::FromStr for Device {
    type Err = VariantError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceType::from_name(s).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::{Device, DeviceType};
    use crate::variant::{Enumerant, VariantError};

    #[test]
    fn test_device_default_is_cpu() {
        assert_eq!(Device::default(), Device::CPU);
        assert_eq!(Device::default().device_type(), DeviceType::Cpu);
        assert!(Device::CPU.is_cpu());
        assert!(!Device::CUDA.is_cpu());
    }

    #[test]
    fn test_device_from_type() {
        let device: Device = DeviceType::Cuda.into();
        assert_eq!(device, Device::CUDA);
        assert_eq!(device.to_string(), "cuda");
        assert_eq!(format!("{:>6}", DeviceType::Cpu), "   cpu");
    }

    #[test]
    fn test_device_parse() {
        assert_eq!("cpu".parse::<Device>(), Ok(Device::CPU));
        assert_eq!(" CUDA ".parse::<Device>(), Ok(Device::CUDA));
        assert_eq!("gpu".parse::<DeviceType>(), Ok(DeviceType::Cuda));

        let err = "tpu".parse::<Device>().unwrap_err();
        assert_eq!(
            err,
            VariantError::Name {
                type_name: "DeviceType",
                name: "tpu".into(),
                expected: "cpu, cuda".into(),
            }
        );
    }

    #[test]
    fn test_device_type_codes() {
        assert_eq!(DeviceType::VARIANTS, &[DeviceType::Cpu, DeviceType::Cuda]);
        for &variant in DeviceType::VARIANTS {
            assert_eq!(DeviceType::try_from(variant.code()), Ok(variant));
        }
        assert_eq!(
            DeviceType::try_from(2),
            Err(VariantError::Code {
                type_name: "DeviceType",
                code: 2
            })
        );
    }
}
