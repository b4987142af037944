use frameq::new_ring;
use std::thread;
use std::time::{Duration, Instant};

fn main() {
    println!("frameq Basic Example");
    println!("====================\n");

    const FRAME_SIZE: usize = 64;
    const N_RECEIVERS: usize = 3;
    const FRAMES: u64 = 2_000;

    let (sender, first_receiver) = new_ring(FRAME_SIZE);
    let mut receivers = vec![first_receiver];
    for _ in 1..N_RECEIVERS {
        receivers.push(receivers[0].try_clone().unwrap());
    }

    println!("Configuration:");
    println!("  Frame size: {} bytes", FRAME_SIZE);
    println!("  Receivers: {}", N_RECEIVERS);
    println!("  Frames sent: {}\n", FRAMES);

    let start = Instant::now();

    let producer = thread::spawn(move || {
        for i in 0..FRAMES {
            let payload = vec![(i % 256) as u8; FRAME_SIZE];
            sender.send(&payload, i).unwrap();
            // A real producer paces itself against a capture device; this
            // sleep stands in for that so receivers occasionally observe
            // conflation rather than racing straight through the buffer.
            thread::sleep(Duration::from_micros(50));
        }
    });

    let consumers: Vec<_> = receivers
        .into_iter()
        .enumerate()
        .map(|(id, receiver)| {
            thread::spawn(move || {
                let mut frames_seen = 0u64;
                let mut last_timestamp = None;
                loop {
                    match receiver.recv() {
                        Ok(frame) => {
                            frames_seen += 1;
                            last_timestamp = Some(frame.timestamp());
                        }
                        Err(_) => break, // sender dropped, no more frames ever
                    }
                    thread::yield_now();
                    if last_timestamp == Some(FRAMES - 1) {
                        break;
                    }
                }
                println!(
                    "Receiver {id} observed {frames_seen} of {FRAMES} frames (last timestamp {last_timestamp:?})"
                );
            })
        })
        .collect();

    producer.join().unwrap();
    for consumer in consumers {
        consumer.join().unwrap();
    }

    println!("\nDuration: {:.2?}", start.elapsed());
}
