use deferred::{Completer, Error, Future};
use std::sync::mpsc::channel;
use std::thread;
use std::time::Duration;

// A request handed to the fake transport thread
struct Call {
    method: &'static str,
    arg: i64,
    response: Completer<i64>,
}

pub fn main() {
    let (tx, rx) = channel::<Call>();

    // Stands in for the network: answers each call after a short delay
    let transport = thread::spawn(move || {
        for call in rx {
            thread::sleep(Duration::from_millis(20));

            let res = match call.method {
                "square" => call.response.complete(call.arg * call.arg),
                _ => call.response.fail(format!("unknown method `{}`", call.method)),
            };

            res.expect("response completed twice");
        }
    });

    let rpc = |method, arg| {
        let (fut, response) = Future::pair();
        tx.send(Call { method, arg, response }).unwrap();
        fut
    };

    let fut = rpc("square", 7);

    let cb_fut = fut.then(|fut: Future<i64>| {
        let val = fut.wait()?;
        println!("RPC return value is {}.", val);
        Ok(val + 1)
    });

    let chain_cb_fut = cb_fut.then(|fut| {
        println!("Chained cb done. {}", fut.wait()?);
        Ok::<_, Error>(())
    });

    let bad = rpc("cube", 3).then(|fut| fut.wait());

    chain_cb_fut.wait().unwrap();

    match bad.wait() {
        Ok(val) => println!("unexpected: {}", val),
        Err(err) => println!("RPC failed: {}", err),
    }

    drop(tx);
    transport.join().unwrap();
}
