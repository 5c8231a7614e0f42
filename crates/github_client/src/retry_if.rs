// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use again::RetryPolicy;
use futures::Future;
use std::time::Duration;

pub async fn retry_if<Value, Error, A, C, F>(action: A, should_retry: C) -> Result<Value, Error>
where
    F: Future<Output = Result<Value, Error>>,
    A: FnMut() -> F,
    C: Fn(&Error) -> bool,
    Error: std::fmt::Debug,
{
    // Capped exponential backoff with jitter. The cap matters for rate
    // limits: GitHub's secondary limits usually clear within a minute.
    let policy = RetryPolicy::exponential(Duration::from_millis(500))
        .with_max_retries(8)
        .with_max_delay(Duration::from_secs(60))
        .with_jitter(true);

    policy.retry_if(action, should_retry).await
}
