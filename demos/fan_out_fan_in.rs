//! One dispatcher hands work items to N workers over a shared channel, then
//! collects N results back over a second channel (§8 scenario 2).

use std::thread;

use chansel::{make, recv, send, Value};
use tracing_subscriber::EnvFilter;

const WORKERS: i64 = 4;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let work = make(WORKERS as usize).expect("room for the work channel");
    let results = make(WORKERS as usize).expect("room for the results channel");

    let handles: Vec<_> = (0..WORKERS)
        .map(|id| {
            thread::spawn(move || loop {
                let Value::Int64(item) = recv(work).expect("work channel still open") else {
                    panic!("work channel only ever carries Int64");
                };
                if item < 0 {
                    break;
                }
                println!("worker {id}: squaring {item}");
                send(results, Value::Int64(item * item)).expect("results channel still open");
            })
        })
        .collect();

    for item in 0..WORKERS {
        send(work, Value::Int64(item)).unwrap();
    }
    for _ in 0..WORKERS {
        send(work, Value::Int64(-1)).unwrap(); // one shutdown signal per worker
    }

    let mut total = 0i64;
    for _ in 0..WORKERS {
        let Value::Int64(square) = recv(results).unwrap() else {
            panic!("results channel only ever carries Int64");
        };
        total += square;
    }
    println!("sum of squares: {total}");

    for h in handles {
        h.join().unwrap();
    }
}
