//! Analog input and heap gauge traits

/// A single analog channel
///
/// Implementations wrap one ADC channel. Reads are assumed to be fast
/// compared to the conditioner's inter-sample delay (~1.1 ms).
pub trait AnalogInput {
    /// Read one raw sample, scaled to the full `u16` range
    ///
    /// Takes `&mut self` because ADC reads typically require mutable access.
    fn read(&mut self) -> u16;
}

/// Source of free-heap readings for the memory watermark sampler
pub trait HeapGauge {
    /// Bytes currently available to the allocator
    fn free_bytes(&mut self) -> usize;
}
