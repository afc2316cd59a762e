//! Example that demonstrates the usage shown in the package documentation.
//!
//! This shows how to parse CPU set expressions, accumulate them and render them again.

use cpuset::{CpuSet, Mode};

fn main() {
    println!("=== cpuset README Example ===");

    let selected_processors = cpuset::parse("0-9,32-35 40", Mode::Strict).unwrap();
    assert_eq!(
        selected_processors.iter().collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 32, 33, 34, 35, 40]
    );

    println!("Selected processors: {selected_processors}");
    println!("As ranges: {}", selected_processors.to_range_string());

    let mut affinity = CpuSet::new();
    affinity.extend_from_str("0-1").unwrap();
    affinity.extend_from_str("8").unwrap();
    println!("Accumulated affinity: {affinity}");

    #[cfg(target_os = "linux")]
    {
        let mask = cpuset::KernelMask::probe().unwrap();
        println!(
            "Kernel affinity masks need room for {} processors",
            mask.cpu_capacity()
        );
    }

    println!("README example completed successfully!");
}
