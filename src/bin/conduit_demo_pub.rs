// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Usage:
//   conduit_demo_pub <topic> <size> <interval_ms>
//
// Publishes a <size>-byte payload of 'A' every <interval_ms>
// milliseconds until interrupted. Pair with conduit_demo_sub on the
// same topic, in another process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use conduit::{Publisher, PublisherOptions};

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("usage: conduit_demo_pub <topic> <size> <interval_ms>");
        std::process::exit(1);
    }
    let topic = &args[1];
    let size: usize = args[2].parse().expect("size");
    let interval_ms: u64 = args[3].parse().expect("interval_ms");

    let quit = Arc::new(AtomicBool::new(false));
    {
        let q = Arc::clone(&quit);
        ctrlc_or_sigterm(move || q.store(true, Ordering::Release));
    }

    let publisher = Publisher::new(
        topic,
        PublisherOptions {
            depth: 16,
            max_message_size: size as u32,
        },
    )
    .expect("create publisher");
    println!("pub: topic '{topic}' ready, publishing {size}-byte payloads");

    let payload = vec![b'A'; size];
    while !quit.load(Ordering::Acquire) {
        let ok = publisher.publish(&payload);
        println!("pub: published {} bytes (ok={ok})", payload.len());
        thread::sleep(Duration::from_millis(interval_ms));
    }
    println!("pub: shutting down");
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
