use derive_more::Display;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    context::default_device,
    device::{Device, DeviceType},
    num::{DataType, Scalar},
};

/// An unresolved options request: any field left out (or given as [`DataType::Default`])
/// is taken from the context when resolved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartialOptions {
    pub dtype: Option<DataType>,
    pub device: Option<Device>,
}

impl PartialOptions {
    #[inline]
    pub const fn new() -> Self {
        Self {
            dtype: None,
            device: None,
        }
    }

    #[inline]
    pub fn with_dtype(mut self, dtype: DataType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    #[inline]
    pub fn with_device(mut self, device: impl Into<Device>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Fills omitted fields from the calling thread's context. Explicit fields always win.
    #[inline]
    pub fn resolve(self) -> TensorOptions {
        let dtype = self.dtype.unwrap_or_default().resolve();
        let device = self.device.unwrap_or_else(default_device);
        TensorOptions { dtype, device }
    }
}

/// The data type and device a tensor is created with. Always concrete: the fields are resolved
/// against the context when the options are constructed, not when they are used.
///
/// ```
/// use tensor_common::{DataType, Device, DeviceGuard, TensorOptions};
///
/// let _guard = DeviceGuard::new(Device::CUDA);
/// let options = TensorOptions::from(DataType::F64);
/// assert_eq!(options.device(), Device::CUDA);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "PartialOptions")
)]
#[display("({dtype}, {device})")]
pub struct TensorOptions {
    dtype: DataType,
    device: Device,
}

impl Default for TensorOptions {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TensorOptions {
    /// Options made entirely of the current defaults.
    #[inline]
    pub fn new() -> Self {
        PartialOptions::new().resolve()
    }

    /// Options for elements of type `T` on the default device.
    #[inline]
    pub fn of<T: Scalar>() -> Self {
        Self::from(T::DATA_TYPE)
    }

    #[inline]
    pub const fn dtype(&self) -> DataType {
        self.dtype
    }

    #[inline]
    pub const fn device(&self) -> Device {
        self.device
    }

    /// Replaces the data type; the placeholder resolves to the current default.
    #[inline]
    pub fn with_dtype(mut self, dtype: DataType) -> Self {
        self.dtype = dtype.resolve();
        self
    }

    #[inline]
    pub fn with_device(mut self, device: impl Into<Device>) -> Self {
        self.device = device.into();
        self
    }

    /// Returns number of bytes of one element.
    #[inline]
    pub fn element_size(&self) -> usize {
        self.dtype.size()
    }
}

impl From<PartialOptions> for TensorOptions {
    #[inline]
    fn from(value: PartialOptions) -> Self {
        value.resolve()
    }
}

impl From<DataType> for TensorOptions {
    #[inline]
    fn from(dtype: DataType) -> Self {
        PartialOptions::new().with_dtype(dtype).resolve()
    }
}

impl From<Device> for TensorOptions {
    #[inline]
    fn from(device: Device) -> Self {
        PartialOptions::new().with_device(device).resolve()
    }
}

impl From<DeviceType> for TensorOptions {
    #[inline]
    fn from(device_type: DeviceType) -> Self {
        Self::from(Device::from(device_type))
    }
}

impl From<(DataType, Device)> for TensorOptions {
    #[inline]
    fn from((dtype, device): (DataType, Device)) -> Self {
        PartialOptions::new()
            .with_dtype(dtype)
            .with_device(device)
            .resolve()
    }
}

impl From<(DataType, DeviceType)> for TensorOptions {
    #[inline]
    fn from((dtype, device_type): (DataType, DeviceType)) -> Self {
        Self::from((dtype, Device::from(device_type)))
    }
}
