use data_loader::{Catalog, PriceCategory, SkinType};
use std::path::Path;
use std::time::Instant;

fn main() {
    let path = Path::new("data/skincare_df.csv");

    println!("Loading product catalog...\n");

    let start = Instant::now();
    let catalog = Catalog::load_from_file(path).expect("Failed to load catalog");
    let elapsed = start.elapsed();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Products: {}", catalog.len());
    println!("Columns: {}", catalog.headers().len());

    for skin_type in SkinType::ALL {
        for budget in PriceCategory::ALL {
            println!(
                "  {:<12} {:<7} {}",
                skin_type.as_str(),
                budget.as_str(),
                catalog.count_matching(skin_type, budget)
            );
        }
    }
}
