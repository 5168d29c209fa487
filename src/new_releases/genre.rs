//! Genre tag classification.
//!
//! Tags are free text coming from artist metadata ("uk drill", "Dance Pop",
//! "k-pop girl group", ...). Rules are evaluated top to bottom and the first
//! bucket with a matching needle wins, so the order of [`GENRE_RULES`] is
//! part of the behavior.

use super::models::BucketKey;
use crate::catalog_client::ArtistMetadata;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
enum Needle {
    /// The tag contains this text.
    Contains(&'static str),
    /// The whole tag equals this text.
    Exact(&'static str),
    /// One of the whitespace-separated words of the tag equals this text.
    Word(&'static str),
}

impl Needle {
    fn matches(&self, tag: &str) -> bool {
        match self {
            Needle::Contains(text) => tag.contains(text),
            Needle::Exact(text) => tag == *text,
            Needle::Word(text) => tag.split_whitespace().any(|word| word == *text),
        }
    }
}

use Needle::{Contains, Exact, Word};

const GENRE_RULES: &[(BucketKey, &[Needle])] = &[
    (
        BucketKey::Rap,
        &[
            Contains("hip hop"),
            Contains("hip-hop"),
            Contains("rap"),
            Contains("trap"),
            Contains("drill"),
            Contains("grime"),
            Contains("pop rap"),
        ],
    ),
    (
        BucketKey::Rnb,
        &[
            Contains("r&b"),
            Contains("rnb"),
            Contains("soul"),
            Contains("new jack swing"),
        ],
    ),
    (
        BucketKey::Pop,
        &[
            Word("pop"),
            Contains("dance pop"),
            Contains("electropop"),
            Contains("synthpop"),
            Contains("teen pop"),
            Contains("uk pop"),
            Contains("art pop"),
            Contains("europop"),
            Contains("pop dance"),
        ],
    ),
    (
        BucketKey::Latin,
        &[
            Contains("latin"),
            Contains("reggaeton"),
            Contains("urbano"),
            Contains("bachata"),
            Contains("salsa"),
            Contains("cumbia"),
            Contains("corrido"),
            Contains("banda"),
            Contains("sertanejo"),
        ],
    ),
    (
        BucketKey::Edm,
        &[
            Contains("edm"),
            Contains("house"),
            Contains("techno"),
            Contains("electro"),
            Contains("dubstep"),
            Contains("drum and bass"),
            Contains("dnb"),
            Contains("trance"),
            Contains("uk garage"),
            Exact("dance"),
        ],
    ),
    (
        BucketKey::Rock,
        &[
            Contains("rock"),
            Contains("grunge"),
            Contains("alternative"),
            Contains("shoegaze"),
        ],
    ),
    (
        BucketKey::Country,
        &[
            Contains("country"),
            Contains("americana"),
            Contains("bluegrass"),
        ],
    ),
    (
        BucketKey::Kpop,
        &[Contains("k-pop"), Contains("kpop"), Contains("korean")],
    ),
    (
        BucketKey::Afrobeats,
        &[
            Contains("afrobeat"),
            Contains("afropop"),
            Contains("afro pop"),
            Contains("afroswing"),
            Contains("amapiano"),
            Contains("nigerian"),
            Contains("ghanaian"),
        ],
    ),
    (
        BucketKey::Jazz,
        &[Contains("jazz"), Contains("bebop"), Contains("bossa nova")],
    ),
    (BucketKey::Dancehall, &[Contains("dancehall"), Contains("soca")]),
    (BucketKey::Reggae, &[Contains("reggae"), Contains("dub")]),
    (
        BucketKey::Indie,
        &[Contains("indie"), Contains("bedroom"), Contains("lo-fi"), Contains("lofi")],
    ),
    (
        BucketKey::Metal,
        &[Contains("metal"), Contains("deathcore"), Contains("djent")],
    ),
    (BucketKey::Punk, &[Contains("punk"), Contains("hardcore")]),
    (
        BucketKey::Folk,
        &[Contains("folk"), Contains("singer-songwriter"), Contains("acoustic")],
    ),
    (BucketKey::Blues, &[Contains("blues")]),
    (
        BucketKey::Classical,
        &[
            Contains("classical"),
            Contains("orchestra"),
            Contains("baroque"),
            Contains("opera"),
            Contains("chamber"),
        ],
    ),
    (
        BucketKey::Soundtrack,
        &[
            Contains("soundtrack"),
            Contains("score"),
            Contains("video game"),
            Contains("anime"),
            Contains("show tunes"),
            Contains("musical"),
        ],
    ),
    (
        BucketKey::Ambient,
        &[
            Contains("ambient"),
            Contains("new age"),
            Contains("drone"),
            Contains("meditation"),
            Contains("sleep"),
        ],
    ),
    (
        BucketKey::Jpop,
        &[
            Contains("j-pop"),
            Contains("jpop"),
            Contains("japanese"),
            Contains("city pop"),
            Contains("vocaloid"),
        ],
    ),
    (
        BucketKey::Desi,
        &[
            Contains("desi"),
            Contains("bollywood"),
            Contains("filmi"),
            Contains("punjabi"),
            Contains("bhangra"),
            Contains("hindi"),
            Contains("indian"),
        ],
    ),
];

/// Maps a set of genre tags to the first matching bucket.
pub fn classify<S: AsRef<str>>(tags: &[S]) -> Option<BucketKey> {
    let normalized: Vec<String> = tags
        .iter()
        .map(|tag| tag.as_ref().trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect();
    if normalized.is_empty() {
        return None;
    }

    GENRE_RULES.iter().find_map(|(bucket, needles)| {
        let hit = normalized
            .iter()
            .any(|tag| needles.iter().any(|needle| needle.matches(tag)));
        hit.then_some(*bucket)
    })
}

/// Picks the artist whose tags classify a release: the primary artist when it
/// has tags, otherwise the first co-credited artist that does.
pub fn tagged_artist<'a>(
    artist_ids: &[String],
    metadata: &'a HashMap<String, ArtistMetadata>,
) -> Option<&'a ArtistMetadata> {
    artist_ids
        .iter()
        .filter_map(|id| metadata.get(id))
        .find(|meta| meta.genres.iter().any(|g| !g.trim().is_empty()))
}
