use pash_core::breadcrumbs::generate;

const MASTER: &str = "Eu gosto de maçãs!";

#[test]
fn reference_crumbs() {
    assert_eq!(generate(MASTER, 2, 1).unwrap(), [1, 0, 0, 0, 0, 1, 1, 0]);
    assert_eq!(generate(MASTER, 2, 8).unwrap(), [15, 2, 12, 14, 6, 1, 3, 6]);
    assert_eq!(generate(MASTER, 3, 4).unwrap(), [2, 12, 8, 1, 9]);
    assert_eq!(generate("abc", 1, 8).unwrap(), [12, 15]);
}

#[test]
fn shallow_depths_keep_low_bits_of_leading_hex_digit() {
    // leading digest digits for step 2 are f, 2, c, e, 6, 1, 3, 6
    assert_eq!(generate(MASTER, 2, 2).unwrap(), [3, 2, 0, 2, 2, 1, 3, 2]);
    assert_eq!(generate(MASTER, 8, 2).unwrap(), [2, 2]);
}
