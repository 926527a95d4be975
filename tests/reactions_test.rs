// End-to-end checks on the standard reaction examples: ore per fuel,
// capacity from a trillion ore, the SQLite store and directory runs.

use std::fs;

use nanofactory::batch;
use nanofactory::db;
use nanofactory::logging;
use nanofactory::parse::parse_book;
use nanofactory::{max_producible, ore_for, resolve, summarize, ReactionBook, SurplusLedger};
use rusqlite::Connection;

const TRILLION: u64 = 1_000_000_000_000;

const SMALL_CHAIN: &str = "\
10 ORE => 10 A
1 ORE => 1 B
7 A, 1 B => 1 C
7 A, 1 C => 1 D
7 A, 1 D => 1 E
7 A, 1 E => 1 FUEL
";

const SHARED_INPUTS: &str = "\
9 ORE => 2 A
8 ORE => 3 B
7 ORE => 5 C
3 A, 4 B => 1 AB
5 B, 7 C => 1 BC
4 C, 1 A => 1 CA
2 AB, 3 BC, 4 CA => 1 FUEL
";

const CLASSIC: &str = "\
157 ORE => 5 NZVS
165 ORE => 6 DCFZ
44 XJWVT, 5 KHKGT, 1 QDVJ, 29 NZVS, 9 GPVTF, 48 HKGWZ => 1 FUEL
12 HKGWZ, 1 GPVTF, 8 PSHF => 9 QDVJ
179 ORE => 7 PSHF
177 ORE => 5 HKGWZ
7 DCFZ, 7 PSHF => 2 XJWVT
165 ORE => 2 GPVTF
3 DCFZ, 7 NZVS, 5 HKGWZ, 10 PSHF => 8 KHKGT
";

const MEDIUM: &str = "\
2 VPVL, 7 FWMGM, 2 CXFTF, 11 MNCFX => 1 STKFG
17 NVRVD, 3 JNWZP => 8 VPVL
53 STKFG, 6 MNCFX, 46 VJHF, 81 HVMC, 68 CXFTF, 25 GNMV => 1 FUEL
22 VJHF, 37 MNCFX => 5 FWMGM
139 ORE => 4 NVRVD
144 ORE => 7 JNWZP
5 MNCFX, 7 RFSQX, 2 FWMGM, 2 VPVL, 19 CXFTF => 3 HVMC
5 VJHF, 7 MNCFX, 9 VPVL, 37 CXFTF => 6 GNMV
145 ORE => 6 MNCFX
1 NVRVD => 8 CXFTF
1 VJHF, 6 MNCFX => 4 RFSQX
176 ORE => 6 VJHF
";

const LARGE: &str = "\
171 ORE => 8 CNZTR
7 ZLQW, 3 BMBT, 9 XCVML, 26 XMNCP, 1 WPTQ, 2 MZWV, 1 RJRHP => 4 PLWSL
114 ORE => 4 BHXH
14 VRPVC => 6 BMBT
6 BHXH, 18 KTJDG, 12 WPTQ, 7 PLWSL, 31 FHTLT, 37 ZDVW => 1 FUEL
6 WPTQ, 2 BMBT, 8 ZLQW, 18 KTJDG, 1 XMNCP, 6 MZWV, 1 RJRHP => 6 FHTLT
15 XDBXC, 2 LTCX, 1 VRPVC => 6 ZLQW
13 WPTQ, 10 LTCX, 3 RJRHP, 14 XMNCP, 2 MZWV, 1 ZLQW => 1 ZDVW
5 BMBT => 4 WPTQ
189 ORE => 9 KTJDG
1 MZWV, 17 XDBXC, 3 XCVML => 2 XMNCP
12 VRPVC, 27 CNZTR => 2 XDBXC
15 KTJDG, 12 BHXH => 5 XCVML
3 BHXH, 2 VRPVC => 7 MZWV
121 ORE => 7 VRPVC
7 XCVML => 6 RJRHP
5 BHXH, 4 VRPVC => 5 LTCX
";

fn book(input: &str) -> ReactionBook {
    parse_book(input, "ORE").expect("example parses")
}

#[test]
fn ore_per_fuel_matches_known_answers() {
    logging::init_test();

    let cases = [
        (SMALL_CHAIN, 31),
        (SHARED_INPUTS, 165),
        (CLASSIC, 13312),
        (MEDIUM, 180697),
        (LARGE, 2210736),
    ];
    for (input, expected) in cases {
        assert_eq!(ore_for(&book(input), "FUEL", 1).unwrap(), expected);
    }
}

#[test]
fn capacity_from_a_trillion_ore() {
    let cases = [(CLASSIC, 82892753), (MEDIUM, 5586022), (LARGE, 460664)];
    for (input, expected) in cases {
        let book = book(input);
        let capacity = max_producible(&book, "FUEL", TRILLION).unwrap();
        assert_eq!(capacity.quantity, expected);
        assert!(capacity.ore_used <= TRILLION);
        assert!(ore_for(&book, "FUEL", expected + 1).unwrap() > TRILLION);
    }
}

#[test]
fn capacity_is_stable_across_runs() {
    let book = book(CLASSIC);
    let first = max_producible(&book, "FUEL", TRILLION).unwrap();
    let second = max_producible(&book, "FUEL", TRILLION).unwrap();
    assert_eq!(first, second);
}

#[test]
fn shared_ledger_would_undercount() {
    // A ledger carried over from an earlier run hands out free surplus,
    // which is why every probe starts fresh.
    let book = book(CLASSIC);
    let mut ledger = SurplusLedger::default();
    let first = resolve("FUEL", 1, &book, &mut ledger).unwrap();
    let second = resolve("FUEL", 1, &book, &mut ledger).unwrap();
    assert_eq!(first, 13312);
    assert!(second < first);
    assert_eq!(ore_for(&book, "FUEL", 1).unwrap(), 13312);
}

#[test]
fn ore_is_monotonic_on_the_large_example() {
    let book = book(LARGE);
    let mut previous = 0;
    for n in 1..150 {
        let ore = ore_for(&book, "FUEL", n).unwrap();
        assert!(ore >= previous);
        previous = ore;
    }
}

#[test]
fn summary_totals_agree_with_resolve() {
    let book = book(MEDIUM);
    let summary = summarize(&book, "FUEL", 3).unwrap();
    assert_eq!(summary.ore, ore_for(&book, "FUEL", 3).unwrap());
    assert!(summary.batches.iter().any(|(m, n)| m == "FUEL" && *n == 3));
    assert!(summary.leftovers.iter().all(|(_, amount)| *amount > 0));
}

#[test]
fn custom_base_resource() {
    let book = parse_book("4 SAND => 1 GLASS\n3 GLASS => 1 LENS", "SAND").unwrap();
    assert_eq!(ore_for(&book, "LENS", 2).unwrap(), 24);
    assert_eq!(max_producible(&book, "LENS", 30).unwrap().quantity, 2);
}

#[test]
fn store_round_trip_on_disk() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut conn = Connection::open(file.path()).unwrap();
    db::init_schema(&conn).unwrap();

    db::store_book(&mut conn, &book(LARGE), Some("large")).unwrap();
    drop(conn);

    let conn = Connection::open(file.path()).unwrap();
    let loaded = db::load_book(&conn, "ORE").unwrap();
    assert_eq!(loaded.len(), 17);
    assert_eq!(ore_for(&loaded, "FUEL", 1).unwrap(), 2210736);
}

#[test]
fn batch_solves_a_directory_and_records_failures() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("classic.txt"), CLASSIC).unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested").join("medium.txt"), MEDIUM).unwrap();
    fs::write(dir.path().join("broken.txt"), "7 A, 1 E -> 1 FUEL\n").unwrap();
    fs::write(dir.path().join("notes.md"), "not a reaction list").unwrap();

    let report = batch::solve_directory(dir.path(), "txt", "ORE", "FUEL", TRILLION);

    assert_eq!(report.solved.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].0.ends_with("broken.txt"));
    assert!(report.failed[0].1.contains("line 1"));

    let classic = report
        .solved
        .iter()
        .find(|(path, _)| path.ends_with("classic.txt"))
        .map(|(_, solution)| *solution)
        .unwrap();
    assert_eq!(classic.ore_per_unit, 13312);
    assert_eq!(classic.capacity.quantity, 82892753);
    assert_eq!(report.to_string(), "Solved 2 files. Failed: 1");
}
