//! atelier-services: Audio devices, codecs, effects, and export

pub mod audio_effects;
pub mod audio_input;
pub mod audio_io;
pub mod beat_loop;
pub mod capture;
pub mod export;
pub mod playback;
pub mod resample;
pub mod tone;
pub mod wav_codec;

pub use audio_effects::{AudioEffect, EffectChain, GainEffect, ImpulseReverbEffect, PitchShiftEffect};
pub use audio_input::{AudioInputError, AudioInputService, InputStreamHandle};
pub use audio_io::{AudioOutputError, AudioOutputService, PlaybackHandle, RealtimeOutputStream};
pub use beat_loop::{BeatLoop, ToneSink};
pub use capture::{CaptureConfig, CaptureError, CaptureSession, MeterState, RecordedAudio};
pub use export::{ExportError, ImageFormat, export_audio, export_image, sanitize_file_name};
pub use playback::{PlaybackError, PlaybackService};
pub use tone::{KickVoice, VoiceMixer};
pub use wav_codec::{CodecError, DecodedAudio, decode_wav, encode_wav};
