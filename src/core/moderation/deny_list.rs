// Terms rejected in submitted resolutions and display names.
//
// Entries are lowercase plain text; `word_filter.rs` expands them into
// leetspeak-tolerant whole-word patterns.

pub const DEFAULT_DENY_LIST: &[&str] = &[
    "ass",
    "asshole",
    "bastard",
    "bitch",
    "bollocks",
    "bullshit",
    "crap",
    "cunt",
    "damn",
    "dick",
    "dickhead",
    "dumbass",
    "fag",
    "faggot",
    "fuck",
    "fucker",
    "fucking",
    "goddamn",
    "hell",
    "jackass",
    "jerk",
    "motherfucker",
    "nigger",
    "nigga",
    "piss",
    "prick",
    "shit",
    "shitty",
    "slut",
    "son of a bitch",
    "whore",
    "wanker",
    "twat",
    "retard",
    "retarded",
    "spic",
    "chink",
    "kike",
    "dyke",
    "tranny",
    "homo",
    "cracker",
    "wetback",
    "beaner",
    "gook",
    "honky",
    "coon",
    "paki",
];
