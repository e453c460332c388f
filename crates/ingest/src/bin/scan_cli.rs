use std::env;
use std::io;
use std::path::Path;

use ingest::usage_records_from_reader;
use monitor_core::UsageRecord;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: scan_cli <path|->");
        std::process::exit(2);
    }

    let path = &args[1];
    let records = if path == "-" {
        usage_records_from_reader(io::stdin().lock())
    } else {
        match ingest::scan_file(Path::new(path), 0) {
            Ok(scan) => {
                if let Some(issue) = scan.issue {
                    eprintln!("read issue: {}", issue);
                }
                scan.records
            }
            Err(err) => {
                eprintln!("failed to scan {}: {}", path, err);
                std::process::exit(1);
            }
        }
    };

    if records.is_empty() {
        eprintln!("no usage records found");
        std::process::exit(3);
    }

    let total_tokens: u64 = records.iter().map(|record| record.total_tokens).sum();
    let total_cost: f64 = records.iter().map(|record| record.cost).sum();
    let input: u64 = records.iter().map(|record| record.input).sum();
    let output: u64 = records.iter().map(|record| record.output).sum();
    let cache_read: u64 = records.iter().map(|record| record.cache_read).sum();

    println!("records {}", records.len());
    println!("total_tokens {}", total_tokens);
    println!("input_tokens {}", input);
    println!("output_tokens {}", output);
    println!("cache_read_tokens {}", cache_read);
    println!("total_cost {:.4}", total_cost);

    if let Some(last) = records.last() {
        print_last(last);
    }
}

fn print_last(record: &UsageRecord) {
    println!(
        "last {} {}/{} {} tokens",
        record.timestamp, record.provider, record.model, record.total_tokens
    );
}
