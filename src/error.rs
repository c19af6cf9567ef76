//! The error taxonomy shared by the real-time loop and the offline
//! analysis pipeline.

use std::borrow::Cow;
use std::fmt;

/// Things that can go wrong while tracking or analyzing a session.
#[derive(Debug)]
pub enum TrackError {
    /// A frame could not be read from the capture source. Fatal to the
    /// real-time loop only; whatever was recorded so far is still emitted.
    CaptureFailure(String),

    /// The entire position series is missing, so there is nothing to
    /// interpolate or segment. Fatal to the offline pipeline.
    NoUsableTrackData,

    /// The grid was reconfigured while a recording was accumulating
    /// dwell time.
    ReconfigureWhileRecording,

    /// Returned when io fails while reading or writing artifacts.
    IoError(std::io::Error),

    /// Returned when a WAV file cannot be read or written.
    HoundError(hound::Error),

    /// Returned when serialization of a configuration record fails.
    RonError(ron::Error),

    /// Returned when deserialization of a configuration record fails.
    RonSpannedError(ron::de::SpannedError),

    /// A saved track file held a value that is not a number.
    MalformedTrackFile(String),

    /// The configuration failed validation.
    InvalidConfig(String),
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TrackError as TE;
        let msg = match self {
            TE::CaptureFailure(why) => Cow::from(format!("frame capture failed: {}", why)),
            TE::NoUsableTrackData => Cow::from("no usable localization data to analyze"),
            TE::ReconfigureWhileRecording => {
                Cow::from("cannot reconfigure the grid while recording")
            }
            TE::IoError(error) => Cow::from(format!("io error: {}", error)),
            TE::HoundError(error) => Cow::from(format!("wav error: {}", error)),
            TE::RonError(error) => Cow::from(format!("ron error: {}", error)),
            TE::RonSpannedError(error) => Cow::from(format!("ron spanning error: {}", error)),
            TE::MalformedTrackFile(line) => {
                Cow::from(format!("malformed value in track file: {:?}", line))
            }
            TE::InvalidConfig(why) => Cow::from(format!("invalid configuration: {}", why)),
        };

        write!(f, "{}", msg)
    }
}

impl std::error::Error for TrackError {}

impl From<std::io::Error> for TrackError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value)
    }
}

impl From<hound::Error> for TrackError {
    fn from(value: hound::Error) -> Self {
        Self::HoundError(value)
    }
}

impl From<ron::Error> for TrackError {
    fn from(value: ron::Error) -> Self {
        Self::RonError(value)
    }
}

impl From<ron::de::SpannedError> for TrackError {
    fn from(value: ron::de::SpannedError) -> Self {
        Self::RonSpannedError(value)
    }
}
