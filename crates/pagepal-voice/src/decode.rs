//! Decoding provider payloads into playable samples.
//!
//! Both cloud providers are asked for headerless 16-bit PCM; WAV is accepted
//! as well for providers that can only return a container.

use std::io::Cursor;

use rodio::Source;

use crate::error::VoiceError;

/// Sample rate of the PCM returned by the OpenAI and Gemini speech APIs.
pub const PROVIDER_PCM_SAMPLE_RATE: u32 = 24_000;

/// Wire format of a synthesized payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// Headerless signed 16-bit little-endian PCM, interleaved.
    Pcm16 { sample_rate: u32, channels: u16 },
    /// RIFF/WAVE container.
    Wav,
}

impl AudioFormat {
    /// Mono 24 kHz PCM16, as produced by both cloud providers.
    pub const PROVIDER_PCM: Self = Self::Pcm16 {
        sample_rate: PROVIDER_PCM_SAMPLE_RATE,
        channels: 1,
    };
}

/// Decoded, playable audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Interleaved f32 samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    /// Number of frames (samples per channel).
    #[must_use]
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Length in seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Decode a provider payload.
pub fn decode(bytes: &[u8], format: AudioFormat) -> Result<AudioClip, VoiceError> {
    match format {
        AudioFormat::Pcm16 {
            sample_rate,
            channels,
        } => decode_pcm16(bytes, sample_rate, channels),
        AudioFormat::Wav => decode_wav(bytes),
    }
}

fn decode_pcm16(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<AudioClip, VoiceError> {
    if sample_rate == 0 || channels == 0 {
        return Err(VoiceError::Decode(format!(
            "invalid PCM layout: {sample_rate} Hz, {channels} channel(s)"
        )));
    }
    if bytes.is_empty() {
        return Err(VoiceError::Decode("empty audio payload".to_string()));
    }
    if bytes.len() % 2 != 0 {
        return Err(VoiceError::Decode(format!(
            "PCM16 payload has odd length {}",
            bytes.len()
        )));
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect();

    Ok(AudioClip {
        samples,
        sample_rate,
        channels,
    })
}

fn decode_wav(bytes: &[u8]) -> Result<AudioClip, VoiceError> {
    let decoder = rodio::Decoder::new_wav(Cursor::new(bytes.to_vec()))
        .map_err(|e| VoiceError::Decode(e.to_string()))?;

    let sample_rate = decoder.sample_rate();
    let channels = decoder.channels();
    let samples: Vec<f32> = decoder.convert_samples::<f32>().collect();

    if samples.is_empty() {
        return Err(VoiceError::Decode("WAV payload contains no samples".to_string()));
    }

    Ok(AudioClip {
        samples,
        sample_rate,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn pcm16_is_normalised() {
        let clip = decode(&pcm_bytes(&[0, 16384, -32768]), AudioFormat::PROVIDER_PCM).unwrap();
        assert_eq!(clip.samples, vec![0.0, 0.5, -1.0]);
        assert_eq!(clip.sample_rate, 24_000);
        assert_eq!(clip.channels, 1);
    }

    #[test]
    fn duration_counts_frames_not_samples() {
        let clip = AudioClip {
            samples: vec![0.0; 48_000],
            sample_rate: 24_000,
            channels: 2,
        };
        assert_eq!(clip.frames(), 24_000);
        assert!((clip.duration() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn odd_length_pcm_is_rejected() {
        let err = decode(&[0, 1, 2], AudioFormat::PROVIDER_PCM).unwrap_err();
        assert!(matches!(err, VoiceError::Decode(_)));
    }

    #[test]
    fn empty_pcm_is_rejected() {
        assert!(matches!(
            decode(&[], AudioFormat::PROVIDER_PCM),
            Err(VoiceError::Decode(_))
        ));
    }

    #[test]
    fn zero_rate_is_rejected() {
        let format = AudioFormat::Pcm16 {
            sample_rate: 0,
            channels: 1,
        };
        assert!(matches!(decode(&[0, 0], format), Err(VoiceError::Decode(_))));
    }

    #[test]
    fn garbage_wav_is_rejected() {
        assert!(matches!(
            decode(b"definitely not riff", AudioFormat::Wav),
            Err(VoiceError::Decode(_))
        ));
    }

    #[test]
    fn wav_header_is_honoured() {
        let data = pcm_bytes(&[0, 16384, 0, -16384]);
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVEfmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&2u16.to_le_bytes()); // stereo
        wav.extend_from_slice(&16_000u32.to_le_bytes());
        wav.extend_from_slice(&(16_000u32 * 4).to_le_bytes());
        wav.extend_from_slice(&4u16.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data.len() as u32).to_le_bytes());
        wav.extend_from_slice(&data);

        let clip = decode(&wav, AudioFormat::Wav).unwrap();
        assert_eq!(clip.channels, 2);
        assert_eq!(clip.sample_rate, 16_000);
        assert_eq!(clip.frames(), 2);
    }
}
