// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Builds a small sigmoid MLP, runs one forward pass, and prints the DAG
//! tensors.
//!
//! ```bash
//! cargo run --example mlp_forward
//! ```

use runtime::{init_runtime, shutdown_runtime, ArenaCapacity, ComputeDevice, Isolate, Network};

fn main() -> anyhow::Result<()> {
    init_runtime();

    let iso = Isolate::create("mlp-demo", ComputeDevice::AutoSelect, ArenaCapacity::from_mib(4));
    println!(
        "isolate '{}' on {} ({} bytes of arena)",
        iso.name(),
        iso.device(),
        iso.arena().capacity()
    );

    let net = Network::new(&iso, &[8, 16, 16, 4]);
    net.randomize(42);
    net.input().copy_from(&[0.1, -0.2, 0.3, -0.4, 0.5, -0.6, 0.7, -0.8]);

    let out = net.forward();
    println!("{out}");
    println!("forward pass: {:?}", out.to_vec());

    println!("arena after one pass: {}", iso.arena().stats().summary());

    shutdown_runtime();
    Ok(())
}
