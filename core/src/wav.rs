use crate::types::MorseError;

const HEADER_BYTES: usize = 44;
const FMT_CHUNK_BYTES: u32 = 16;
const FORMAT_PCM: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Serialize interleaved 16-bit PCM into a canonical little-endian
/// RIFF/WAVE file image. Equal inputs produce identical bytes.
pub fn wav_bytes(
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
) -> Result<Vec<u8>, MorseError> {
    if sample_rate == 0 {
        return Err(MorseError::Config {
            name: "sampleRate",
            value: 0.0,
        });
    }
    if channels == 0 {
        return Err(MorseError::Config {
            name: "channels",
            value: 0.0,
        });
    }

    let data_size = samples.len() as u64 * 2;
    if data_size > (u32::MAX as u64 - HEADER_BYTES as u64) {
        return Err(MorseError::Overflow {
            what: "wav data size",
            count: data_size,
        });
    }
    let data_size = data_size as u32;

    let block_align = channels * (BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate * block_align as u32;

    let mut bytes = Vec::with_capacity(HEADER_BYTES + data_size as usize);

    // RIFF header
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_size).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    // fmt chunk
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&FMT_CHUNK_BYTES.to_le_bytes());
    bytes.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }

    Ok(bytes)
}
