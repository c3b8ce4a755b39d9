/// GPU core configuration

/// Construction-time options for `GpuContext`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpuConfig {
    /// Reversed depth range: depth bias is negated and the clip volume is set
    /// to a lower-left origin with a zero-to-one depth range
    pub reversed_depth: bool,
    /// Build the render targets at this size when the context is created
    pub initial_output_size: Option<(u32, u32)>,
}

impl GpuConfig {
    pub fn with_reversed_depth(mut self, reversed: bool) -> Self {
        self.reversed_depth = reversed;
        self
    }

    pub fn with_initial_output_size(mut self, width: u32, height: u32) -> Self {
        self.initial_output_size = Some((width, height));
        self
    }
}
