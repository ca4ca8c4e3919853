//! `paperforge chapters`: list the syllabus.

use paperforge_engine::SyllabusRegistry;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let registry = SyllabusRegistry::class10_science()?;

    println!("CBSE Class 10 Science ({} chapters)\n", registry.len());
    for (i, entry) in registry.entries().iter().enumerate() {
        println!("{:>2}. {}", i + 1, entry.chapter);
        if !entry.topics.is_empty() {
            println!("    {}", entry.topics.join(", "));
        }
    }

    Ok(())
}
