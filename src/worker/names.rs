use rand::seq::SliceRandom;
use rand::Rng;

use super::Gender;

const FEMALE: &[&str] = &[
    "Ada", "Berta", "Clara", "Dora", "Elsa", "Frieda", "Greta", "Hanna", "Ida", "Johanna", "Klara", "Lotte",
    "Marta", "Nora", "Olga", "Paula", "Rosa", "Selma", "Thea", "Wilma",
];

const MALE: &[&str] = &[
    "Anton", "Bruno", "Carl", "Emil", "Franz", "Georg", "Hans", "Jakob", "Karl", "Ludwig", "Max", "Otto",
    "Paul", "Rudolf", "Simon", "Theo", "Valentin", "Walter", "Xaver", "Ziggy",
];

const SURNAMES: &[&str] = &[
    "Bauer", "Becker", "Fischer", "Hoffmann", "Keller", "Koch", "Lange", "Meyer", "Miller", "Richter",
    "Schmidt", "Schneider", "Schulz", "Wagner", "Weber", "Wolf", "Zimmermann",
];

/// "First Last" with the first name drawn from the gender's list.
pub fn generate_name<R: Rng + ?Sized>(rng: &mut R, gender: Gender) -> String {
    let firsts = match gender {
        Gender::Female => FEMALE,
        Gender::Male => MALE,
    };
    let first = firsts.choose(rng).copied().unwrap_or("Anon");
    let last = SURNAMES.choose(rng).copied().unwrap_or("Settler");
    format!("{first} {last}")
}
