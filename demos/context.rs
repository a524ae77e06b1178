use std::error::Error;

use tensor_common::{
    Context, DataType, Device, DeviceGuard, DtypeGuard, Stamp, TensorOptions, next_tick,
};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("initial context: {}", Context::current());
    println!("options: {}", TensorOptions::new());
    {
        let _device = DeviceGuard::new(Device::CUDA);
        {
            let _dtype = DtypeGuard::new(DataType::F64);
            println!("options: {}", TensorOptions::new());
        }
        println!("options: {}", TensorOptions::new());
    }
    println!("options: {}", TensorOptions::new());

    let task = Context::new()
        .with_dtype(DataType::F64)
        .scope(|| Context::bind(TensorOptions::new));
    let worker = std::thread::spawn(task);
    let options = worker.join().map_err(|_| "worker panicked")?;
    println!("options on worker: {options}");

    let mut stamp = Stamp::new();
    let seen = stamp.tick();
    stamp.touch();
    println!(
        "stamp {} newer than {seen}: {}, next tick {}",
        stamp.tick(),
        stamp.is_newer_than(seen),
        next_tick()
    );

    let dtype = "half".parse::<DataType>();
    println!("parse `half`: {dtype:?}");

    Ok(())
}
