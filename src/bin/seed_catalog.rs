//! Utility to seed a demo catalog, goals and regimen into the database

use std::path::PathBuf;

use regimen_builder::models::{
    Frequency, IngredientPrice, IngredientRange, IngredientRangeSet, IngredientType,
    IngredientUnits, Product, ProductCreate, ProductIngredientCreate, ProductQuantity,
    RegimenProduct,
};

fn get_database_path() -> PathBuf {
    std::env::var("REGIMEN_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            std::fs::create_dir_all(&path).ok();
            path.push("regimen.db");
            path
        })
}

const INGREDIENTS: &[(&str, IngredientUnits, f64)] = &[
    ("Calcium", IngredientUnits::Mg, 0.0004),
    ("Magnesium", IngredientUnits::Mg, 0.0009),
    ("Zinc", IngredientUnits::Mg, 0.004),
    ("Vitamin D3", IngredientUnits::Iu, 0.00002),
    ("Vitamin B12", IngredientUnits::Mcg, 0.0005),
];

const GOALS: &[(&str, Option<f64>, Option<f64>, IngredientUnits)] = &[
    ("Calcium", Some(1000.0), Some(2500.0), IngredientUnits::Mg),
    ("Magnesium", Some(400.0), Some(700.0), IngredientUnits::Mg),
    ("Zinc", Some(11.0), Some(40.0), IngredientUnits::Mg),
    ("Vitamin D3", Some(600.0), Some(4000.0), IngredientUnits::Iu),
];

fn demo_products() -> Vec<ProductCreate> {
    fn line(name: &str, amount: f64, units: IngredientUnits) -> ProductIngredientCreate {
        ProductIngredientCreate { ingredient_name: name.to_string(), amount, units }
    }

    vec![
        ProductCreate {
            id: "cal-mag-zinc".to_string(),
            name: "Cal-Mag-Zinc + D3".to_string(),
            brand: Some("Demo Labs".to_string()),
            unit_price: 0.12,
            ingredients: Some(vec![
                line("Calcium", 333.0, IngredientUnits::Mg),
                line("Magnesium", 133.0, IngredientUnits::Mg),
                line("Zinc", 5.0, IngredientUnits::Mg),
                line("Vitamin D3", 200.0, IngredientUnits::Iu),
            ]),
        },
        ProductCreate {
            id: "vitamin-d3-5000".to_string(),
            name: "Vitamin D3 5000 IU".to_string(),
            brand: Some("Demo Labs".to_string()),
            unit_price: 0.05,
            ingredients: Some(vec![line("Vitamin D3", 5000.0, IngredientUnits::Iu)]),
        },
        ProductCreate {
            id: "b12-methyl".to_string(),
            name: "Methyl B12".to_string(),
            brand: None,
            unit_price: 0.08,
            ingredients: Some(vec![line("Vitamin B12", 1000.0, IngredientUnits::Mcg)]),
        },
        ProductCreate {
            id: "greens-powder".to_string(),
            name: "Greens Powder".to_string(),
            brand: None,
            unit_price: 1.10,
            ingredients: None,
        },
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_database_path();
    println!("Database path: {}", db_path.display());

    let database = regimen_builder::db::Database::new(&db_path)?;

    database.with_conn(|conn| {
        regimen_builder::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    database.with_conn(|conn| {
        for &(name, units, price) in INGREDIENTS {
            IngredientType::upsert(conn, &IngredientType::new(name, units))?;
            IngredientPrice::set(
                conn,
                &IngredientPrice { ingredient_name: name.to_string(), price, units },
            )?;
        }
        println!("Ingredient types: {}", INGREDIENTS.len());

        for &(name, minimum_amount, maximum_amount, units) in GOALS {
            IngredientRange::set(
                conn,
                &IngredientRangeSet {
                    ingredient_name: name.to_string(),
                    minimum_amount,
                    maximum_amount,
                    units,
                    frequency: Frequency::Daily,
                },
            )?;
        }
        println!("Goals: {}", GOALS.len());
        Ok(())
    })?;

    database.with_conn_mut(|conn| {
        for data in demo_products() {
            if Product::get_by_id(conn, &data.id)?.is_some() {
                println!("  {} already present", data.id);
                continue;
            }
            let product = Product::create(conn, &data)?;
            println!("  Added {} ({})", product.name, product.id);
        }
        Ok(())
    })?;

    database.with_conn(|conn| {
        let entry = RegimenProduct::upsert(
            conn,
            &RegimenProduct::new("cal-mag-zinc", ProductQuantity::default()),
        )?;
        println!(
            "Regimen: {} x {} {} {}",
            entry.product_id,
            entry.quantity.amount,
            entry.quantity.units.as_str(),
            entry.quantity.frequency.as_str()
        );
        Ok(())
    })?;

    Ok(())
}
