//! Container codec: turns WAV/MP3 bytes into an [`AudioBuffer`] and back to WAV.

use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::dsp::AudioBuffer;
use crate::error::{GameError, Result};

pub const MIME_WAV: &str = "audio/wav";
pub const MIME_MP3: &str = "audio/mpeg";

/// Sample format written into rendered WAV files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 16-bit signed PCM.
    #[default]
    Pcm16,
    /// 32-bit IEEE float.
    Float32,
}

impl OutputFormat {
    fn wav_spec(self, channels: u16, sample_rate: u32) -> hound::WavSpec {
        let (bits_per_sample, sample_format) = match self {
            OutputFormat::Pcm16 => (16, hound::SampleFormat::Int),
            OutputFormat::Float32 => (32, hound::SampleFormat::Float),
        };
        hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample,
            sample_format,
        }
    }
}

/// Decode a source asset according to its MIME type.
pub fn decode(bytes: &[u8], mime: &str) -> Result<AudioBuffer> {
    match mime {
        "audio/wav" | "audio/x-wav" | "audio/wave" => decode_wav(bytes),
        "audio/mpeg" | "audio/mp3" => decode_mp3(bytes),
        other => Err(GameError::UnsupportedFormat(other.to_string())),
    }
}

/// Decode WAV bytes, normalizing integer PCM to [-1, 1).
pub fn decode_wav(bytes: &[u8]) -> Result<AudioBuffer> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let samples: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    AudioBuffer::from_interleaved(&samples, spec.channels as usize, spec.sample_rate)
}

/// Decode MP3 bytes frame by frame.
pub fn decode_mp3(bytes: &[u8]) -> Result<AudioBuffer> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(bytes));
    let mut samples = Vec::new();
    let mut format: Option<(usize, u32)> = None;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                let frame_format = (frame.channels, frame.sample_rate as u32);
                match format {
                    None => format = Some(frame_format),
                    Some(f) if f != frame_format => {
                        return Err(GameError::Codec(format!(
                            "mp3 changes format mid-stream: {f:?} -> {frame_format:?}"
                        )));
                    }
                    Some(_) => {}
                }
                samples.extend(frame.data.iter().map(|&s| s as f64 / 32768.0));
            }
            Err(minimp3::Error::Eof) => break,
            Err(minimp3::Error::SkippedData) => continue,
            Err(e) => return Err(GameError::Codec(format!("mp3: {e:?}"))),
        }
    }

    let (channels, sample_rate) =
        format.ok_or_else(|| GameError::Codec("mp3 contains no audio frames".into()))?;
    AudioBuffer::from_interleaved(&samples, channels, sample_rate)
}

/// Encode a buffer as a WAV file.
pub fn encode_wav(buffer: &AudioBuffer, format: OutputFormat) -> Result<Vec<u8>> {
    let channels = u16::try_from(buffer.channel_count())
        .map_err(|_| GameError::Codec(format!("too many channels: {}", buffer.channel_count())))?;
    let spec = format.wav_spec(channels, buffer.sample_rate());

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for sample in buffer.to_interleaved() {
            match format {
                OutputFormat::Pcm16 => {
                    let v = (sample.clamp(-1.0, 1.0) * i16::MAX as f64).round() as i16;
                    writer.write_sample(v)?;
                }
                OutputFormat::Float32 => writer.write_sample(sample as f32)?,
            }
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn stereo_ramp() -> AudioBuffer {
        let left: Vec<f64> = (0..64).map(|i| i as f64 / 64.0 - 0.5).collect();
        let right: Vec<f64> = left.iter().map(|s| -s).collect();
        AudioBuffer::new(vec![left, right], 44100).unwrap()
    }

    #[test]
    fn wav_header_valid() {
        let wav = encode_wav(&stereo_ramp(), OutputFormat::Pcm16).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");

        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 2);
        let sr = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sr, 44100);
    }

    #[test]
    fn pcm16_decode_is_close_to_source() {
        let source = stereo_ramp();
        let wav = encode_wav(&source, OutputFormat::Pcm16).unwrap();
        let decoded = decode(&wav, MIME_WAV).unwrap();

        assert_eq!(decoded.channel_count(), 2);
        assert_eq!(decoded.len(), 64);
        assert_eq!(decoded.sample_rate(), 44100);
        for (a, b) in source.to_interleaved().iter().zip(decoded.to_interleaved()) {
            assert_abs_diff_eq!(*a, b, epsilon = 1.0 / 16384.0);
        }
    }

    #[test]
    fn float32_keeps_precision() {
        let source = stereo_ramp();
        let wav = encode_wav(&source, OutputFormat::Float32).unwrap();
        let decoded = decode_wav(&wav).unwrap();
        for (a, b) in source.to_interleaved().iter().zip(decoded.to_interleaved()) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-7);
        }
    }

    #[test]
    fn pcm16_clamps_overs() {
        let hot = AudioBuffer::new(vec![vec![1.5, -1.5]], 8000).unwrap();
        let decoded = decode_wav(&encode_wav(&hot, OutputFormat::Pcm16).unwrap()).unwrap();
        let ch = decoded.channel(0).unwrap();
        assert!(ch[0] <= 1.0 && ch[0] > 0.999);
        assert!(ch[1] >= -1.0 && ch[1] < -0.999);
    }

    #[test]
    fn garbage_is_a_codec_error() {
        let err = decode_wav(b"definitely not a wav file").unwrap_err();
        assert!(matches!(err, GameError::Codec(_) | GameError::Io(_)), "got {err:?}");
    }

    #[test]
    fn unknown_mime_is_unsupported() {
        let err = decode(b"", "audio/ogg").unwrap_err();
        assert!(matches!(err, GameError::UnsupportedFormat(m) if m == "audio/ogg"));
    }

    #[test]
    fn output_format_names() {
        assert_eq!(serde_json::to_string(&OutputFormat::Float32).unwrap(), "\"float32\"");
        let f: OutputFormat = serde_json::from_str("\"pcm16\"").unwrap();
        assert_eq!(f, OutputFormat::Pcm16);
    }
}
