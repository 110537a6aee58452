// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Palaver chat client.
//!
//! Provides mock adapters and a test harness for deterministic
//! conversation tests without a network or a real server.

pub mod failing_kv;
pub mod harness;
pub mod mock_channel;

pub use failing_kv::FailingKv;
pub use harness::TestHarness;
pub use mock_channel::MockChannel;
