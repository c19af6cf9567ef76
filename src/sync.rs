//! Reconciles the two independently sampled timelines of a session: the
//! position series (one sample per video frame) and the audio stream
//! (one sample per 1/audio_rate seconds).
//!
//! The audio recorder keeps running while the detector has not yet locked
//! on, so the leading and trailing trims reported by interpolation are
//! first converted to sample offsets to re-align both streams to the same
//! starting instant. After that, whichever stream runs long is cut back so
//! both cover exactly the same wall-clock span.

use crate::error::TrackError;
use crate::interpolate::CleanTrack;
use log::{info, warn};

/// What the synchronizer had to do to line the streams up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncAdjustment {
    /// Frames dropped from the end of the track because the audio ran out
    /// early. Zero when the audio covered the full video duration.
    pub frames_dropped: usize,
    /// Audio samples cut from the end to match the video duration.
    pub samples_trimmed: usize,
}

/// Aligns `audio` with `track` in place and returns the synchronized
/// audio window.
///
/// A shorter-than-expected audio stream is recoverable: the surplus
/// trailing frames are dropped from the track and the adjustment is
/// logged. Only a track that loses every frame is an error.
pub fn synchronize(
    audio: &[f32],
    audio_rate: u32,
    track: &mut CleanTrack,
    frame_rate: f64,
) -> Result<(Vec<f32>, SyncAdjustment), TrackError> {
    let samples_per_frame = audio_rate as f64 / frame_rate;

    // Window the audio to the instant span the cleaned track covers.
    let lead = (track.leading_trim as f64 * samples_per_frame) as usize;
    let trail = (track.trailing_trim as f64 * samples_per_frame) as usize;
    let window_end = audio.len().saturating_sub(trail);
    let window = &audio[lead.min(window_end)..window_end];

    let mut frames_dropped = 0;
    let expected_secs = track.len() as f64 / frame_rate;
    let actual_secs = window.len() as f64 / audio_rate as f64;

    if actual_secs < expected_secs {
        frames_dropped = ((expected_secs - actual_secs) * frame_rate).ceil() as usize;
        warn!(
            "audio is {:.3}s shorter than the video span; dropping the last {} position samples",
            expected_secs - actual_secs,
            frames_dropped
        );

        if frames_dropped >= track.len() {
            return Err(TrackError::NoUsableTrackData);
        }
        track.xs.truncate(track.len() - frames_dropped);
        track.ys.truncate(track.xs.len());
    }

    let max_audio_len = (track.len() as f64 * samples_per_frame) as usize;
    let samples_trimmed = window.len().saturating_sub(max_audio_len);
    info!("trimming the last {} samples from audio", samples_trimmed);

    let synced = window[..window.len() - samples_trimmed].to_vec();
    Ok((
        synced,
        SyncAdjustment {
            frames_dropped,
            samples_trimmed,
        },
    ))
}
