//! Fuzz harness for the record decoders.
//!
//! Feeds arbitrary bytes, converted lossily to UTF-8, through both the
//! roster and activity decoders, then re-encodes whatever survived.
//! None of these steps may panic.

#![no_main]
use libfuzzer_sys::fuzz_target;
use pacer_core::TeamMember;
use pacer_core::codec::{decode_activities, decode_roster, encode_activities, encode_roster};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    let roster = decode_roster(&text);
    let _ = encode_roster(&roster.records);
    let members: Vec<TeamMember> = roster.records.iter().map(|e| e.member.clone()).collect();

    let decoded = decode_activities(&text, &members);
    let _ = encode_activities(&decoded.records, &members);
});
