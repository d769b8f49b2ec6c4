/// The kinds of sound a dispatcher may ask a voice to play.
///
/// There is only one today, so the capability check is a plain match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoundDescriptor {
    #[default]
    FilteredNoise,
}

/// Whether a noise voice can play `sound`.
pub const fn can_handle(sound: &SoundDescriptor) -> bool {
    match sound {
        SoundDescriptor::FilteredNoise => true,
    }
}
