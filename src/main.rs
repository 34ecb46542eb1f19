use log::{debug, info};
use multiskip::{RandomCoin, SkipList};

fn main() {
    env_logger::init();

    let mut ints: SkipList<i32> = SkipList::with_coin(5, Box::new(RandomCoin::seeded(100)));
    for value in [9, 7, 8, 1, 4, 3, 5] {
        debug!("inserting {}", value);
        ints.insert(value);
    }

    info!("{} ints inserted", ints.len());
    println!("{}", ints.dump());
    println!("{}", ints);

    let probe = 4;
    let cursor = ints.find(&probe);
    info!("find({}) -> {:?}", probe, ints.value(cursor));
    ints.remove(&probe);
    info!("after remove({}): find -> end: {}", probe, ints.find(&probe) == ints.end());
    println!("{}", ints.dump());

    let mut words: SkipList<String> = SkipList::new(10);
    for word in ["c", "a", "d", "b", "f", "e"] {
        words.insert(word.to_string());
    }
    println!("{}", words);
}
