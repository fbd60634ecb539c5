// SPDX-License-Identifier: Apache-2.0

#![no_main]

use clarity_core::api::types::{Envelope, ErrorBody, Integration, VulnerabilityCounts};
use clarity_core::utils::encode_component;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<Envelope<VulnerabilityCounts>>(data);
    let _ = serde_json::from_slice::<Envelope<Vec<Integration>>>(data);
    if let Ok(body) = serde_json::from_slice::<ErrorBody>(data) {
        let _ = body.describe(400);
    }
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = encode_component(s);
    }
});
