// Purpose - the caller-owned audio block voices mix into

/// Non-interleaved multi-channel audio block.
///
/// The dispatcher owns one of these per audio callback and every active
/// voice adds into it, so nothing here ever clears samples on its own.
#[derive(Debug, Default, Clone)]
pub struct AudioBuffer {
    pub buffers: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn new(channels: usize, samples: usize) -> Self {
        Self {
            buffers: vec![vec![0.0; samples]; channels],
        }
    }

    pub fn num_channels(&self) -> usize {
        self.buffers.len()
    }

    /// Length of the shortest channel.
    pub fn num_samples(&self) -> usize {
        self.buffers.iter().map(Vec::len).min().unwrap_or(0)
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.buffers[index]
    }

    pub fn clear(&mut self) {
        for channel in &mut self.buffers {
            channel.fill(0.0);
        }
    }

    /// Add `source` into `channel` starting at `start`.
    ///
    /// Samples that would land past the end of the channel are dropped.
    pub fn add_from(&mut self, channel: usize, start: usize, source: &[f32]) {
        let Some(dest) = self.buffers.get_mut(channel) else {
            return;
        };
        let Some(dest) = dest.get_mut(start..) else {
            return;
        };

        for (d, &s) in dest.iter_mut().zip(source.iter()) {
            *d += s;
        }
    }

    pub fn is_silent(&self) -> bool {
        self.buffers.iter().flatten().all(|&s| s == 0.0)
    }

    pub fn peak(&self) -> f32 {
        self.buffers
            .iter()
            .flatten()
            .fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }
}
