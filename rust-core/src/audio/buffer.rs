//! Lock-free sample ring between the playback writer and the device callback

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

/// Sample ring buffer, split once into writer and device ends
pub struct AudioRingBuffer {
    producer: HeapProducer<f64>,
    consumer: HeapConsumer<f64>,
}

impl AudioRingBuffer {
    /// Create new ring buffer with given capacity
    ///
    /// # Arguments
    /// * `capacity` - Buffer capacity in samples
    pub fn new(capacity: usize) -> Self {
        let rb = HeapRb::<f64>::new(capacity);
        let (producer, consumer) = rb.split();

        Self { producer, consumer }
    }

    /// Split into producer and consumer ends
    pub fn split(self) -> (AudioProducer, AudioConsumer) {
        (
            AudioProducer {
                producer: self.producer,
            },
            AudioConsumer {
                consumer: self.consumer,
            },
        )
    }
}

/// Writer end, owned by the thread streaming the filtered buffer
pub struct AudioProducer {
    producer: HeapProducer<f64>,
}

impl AudioProducer {
    /// Push as many samples as fit
    ///
    /// # Returns
    /// Number of samples actually written (less than `samples.len()` when full)
    pub fn write(&mut self, samples: &[f64]) -> usize {
        self.producer.push_slice(samples)
    }

    /// Number of free slots
    pub fn free_len(&self) -> usize {
        self.producer.free_len()
    }

    /// Number of samples still queued for the device
    pub fn queued(&self) -> usize {
        self.producer.len()
    }
}

/// Device end, moved into the output callback
pub struct AudioConsumer {
    consumer: HeapConsumer<f64>,
}

impl AudioConsumer {
    /// Fill an interleaved device buffer, one queued sample per frame
    ///
    /// The mono sample is copied to every channel of the frame. Frames with
    /// no queued sample are zeroed.
    ///
    /// # Returns
    /// Number of frames filled from the ring
    pub fn fill_frames(&mut self, data: &mut [f32], channels: usize) -> usize {
        let mut filled = 0;
        for frame in data.chunks_mut(channels.max(1)) {
            match self.consumer.pop() {
                Some(sample) => {
                    frame.fill(sample as f32);
                    filled += 1;
                }
                None => frame.fill(0.0),
            }
        }
        filled
    }

    /// Number of queued samples
    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_write_fill() {
        let rb = AudioRingBuffer::new(1024);
        let (mut producer, mut consumer) = rb.split();

        let written = producer.write(&[0.5, -0.25, 0.125]);
        assert_eq!(written, 3);
        assert_eq!(producer.queued(), 3);

        let mut data = vec![1.0_f32; 3];
        let filled = consumer.fill_frames(&mut data, 1);
        assert_eq!(filled, 3);
        assert_eq!(data, vec![0.5, -0.25, 0.125]);
        assert!(consumer.is_empty());
    }

    #[test]
    fn test_ring_buffer_overflow() {
        let rb = AudioRingBuffer::new(10);
        let (mut producer, consumer) = rb.split();

        let written = producer.write(&[1.0; 20]);
        assert_eq!(written, 10);
        assert_eq!(producer.free_len(), 0);
        assert_eq!(consumer.len(), 10);
    }

    #[test]
    fn test_fill_duplicates_channels() {
        let rb = AudioRingBuffer::new(16);
        let (mut producer, mut consumer) = rb.split();
        producer.write(&[0.25, 0.75]);

        let mut data = vec![9.0_f32; 6];
        let filled = consumer.fill_frames(&mut data, 2);

        // Two frames from the ring, the third zero-padded
        assert_eq!(filled, 2);
        assert_eq!(data, vec![0.25, 0.25, 0.75, 0.75, 0.0, 0.0]);
    }

    #[test]
    fn test_fill_from_empty() {
        let rb = AudioRingBuffer::new(16);
        let (_producer, mut consumer) = rb.split();

        let mut data = vec![1.0_f32; 4];
        assert_eq!(consumer.fill_frames(&mut data, 1), 0);
        assert!(data.iter().all(|&s| s == 0.0));
    }
}
