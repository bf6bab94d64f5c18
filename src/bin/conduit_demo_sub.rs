// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Usage:
//   conduit_demo_sub <topic> <interval_ms>
//
// Waits for conduit_demo_pub's region to exist, attaches, then polls
// with a <interval_ms> timeout and prints every message it receives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use conduit::{Region, Subscriber, SubscriberOptions};

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: conduit_demo_sub <topic> <interval_ms>");
        std::process::exit(1);
    }
    let topic = &args[1];
    let interval_ms: u64 = args[2].parse().expect("interval_ms");

    let running = Arc::new(AtomicBool::new(true));
    {
        let r = Arc::clone(&running);
        ctrlc_or_sigterm(move || r.store(false, Ordering::Release));
    }

    println!("sub: waiting for topic '{topic}'...");
    if !Region::wait_until_exists(topic, &running, Duration::from_millis(100)) {
        println!("sub: interrupted before publisher appeared");
        return;
    }

    let mut subscriber =
        Subscriber::new(topic, SubscriberOptions::default()).expect("attach subscriber");
    println!("sub: attached, waiting for messages");

    let mut received = 0u64;
    while running.load(Ordering::Acquire) {
        match subscriber.wait_for(Duration::from_millis(interval_ms)) {
            Some(msg) => {
                received += 1;
                println!(
                    "sub: #{received} seq={} ts={} size={}",
                    msg.sequence,
                    msg.timestamp_ns,
                    msg.payload.len()
                );
            }
            None => println!("sub: waiting... ({received} received so far)"),
        }
    }
    println!("sub: shutting down, {received} messages received");
}

fn ctrlc_or_sigterm(f: impl Fn() + Send + 'static) {
    #[cfg(unix)]
    {
        use std::sync::Mutex;
        static CB: std::sync::OnceLock<Mutex<Box<dyn Fn() + Send>>> = std::sync::OnceLock::new();
        CB.get_or_init(|| Mutex::new(Box::new(f)));
        extern "C" fn handler(_: libc::c_int) {
            if let Some(cb) = CB.get() {
                if let Ok(g) = cb.lock() {
                    g();
                }
            }
        }
        unsafe {
            libc::signal(libc::SIGINT, handler as *const () as libc::sighandler_t);
            libc::signal(libc::SIGTERM, handler as *const () as libc::sighandler_t);
        }
    }
    #[cfg(not(unix))]
    {
        let _ = f;
    }
}
