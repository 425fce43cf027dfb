//! A scheduler thread parks on a zero-value channel until a worker signals
//! that a job is ready, mirroring the source's canonical "wait for
//! notification" pattern (§8 scenario 1).

use std::thread;
use std::time::Duration;

use chansel::{make, recv, send, Value};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let notify = make(1).expect("table has room for one channel");

    let worker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        println!("worker: job finished, notifying scheduler");
        send(notify, Value::Int8(1)).expect("notify channel still open");
    });

    println!("scheduler: waiting for the worker");
    recv(notify).expect("notify channel still open");
    println!("scheduler: woke up, job is done");

    worker.join().unwrap();
}
