pub mod album;
pub mod artist;
pub mod song;

pub use album::Album;
pub use artist::{
    Artist, ArtistStub, EnsureArtistRequest, InitArtistProfileRequest, NewArtist,
};
pub use song::Song;
