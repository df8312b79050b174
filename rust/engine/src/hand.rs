use crate::cards::Card;

/// Hand category ladder, weakest first so the derived ordering is the poker ordering.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Category {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

/// Totally ordered strength of a best-of-seven poker hand.
///
/// Field order matters: the derived `Ord` compares category first, then the
/// tiebreak ranks high-to-low. Two `HandValue`s are equal exactly when the
/// hands split the pot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct HandValue {
    pub category: Category,
    /// Tiebreak ranks, most significant first; unused slots are zero.
    pub ranks: [u8; 5],
}

/// Evaluates the best 5-card poker hand out of 7 cards.
///
/// Standard hold'em ranking: the returned [`HandValue`] orders any two
/// 7-card hands correctly via its derived `Ord`, including kicker
/// comparisons and the ace-low straight (which ranks as 5-high).
///
/// # Examples
///
/// ```
/// use triboard_engine::hand::{evaluate, Category};
///
/// let cards: Vec<_> = ["Ah", "Kh", "Qh", "Jh", "Th", "2c", "3d"]
///     .iter()
///     .map(|s| s.parse().unwrap())
///     .collect();
/// let value = evaluate(&cards.try_into().unwrap());
/// assert_eq!(value.category, Category::StraightFlush);
/// assert_eq!(value.ranks[0], 14);
/// ```
pub fn evaluate(cards: &[Card; 7]) -> HandValue {
    let mut rank_counts = [0u8; 15];
    let mut suit_masks = [0u16; 4];
    let mut suit_counts = [0u8; 4];
    for &c in cards {
        let r = c.rank.value();
        rank_counts[r as usize] += 1;
        let s = c.suit.index();
        suit_counts[s] += 1;
        suit_masks[s] |= 1 << r;
    }

    let flush_suit = (0..4).find(|&s| suit_counts[s] >= 5);

    if let Some(s) = flush_suit {
        if let Some(high) = straight_high(suit_masks[s]) {
            return HandValue {
                category: Category::StraightFlush,
                ranks: [high, 0, 0, 0, 0],
            };
        }
    }

    if let Some(quad) = highest_with_count(&rank_counts, 4) {
        let kicker = descending_ranks(&rank_counts)
            .find(|&r| r != quad)
            .unwrap_or(0);
        return HandValue {
            category: Category::FourOfAKind,
            ranks: [quad, kicker, 0, 0, 0],
        };
    }

    let trips: Vec<u8> = descending_ranks(&rank_counts)
        .filter(|&r| rank_counts[r as usize] == 3)
        .collect();
    let pairs: Vec<u8> = descending_ranks(&rank_counts)
        .filter(|&r| rank_counts[r as usize] == 2)
        .collect();

    if let Some(&trip) = trips.first() {
        // a second trip fills in as the pair of a full house
        let pair_part = trips.get(1).copied().or_else(|| pairs.first().copied());
        if let Some(pair) = pair_part {
            return HandValue {
                category: Category::FullHouse,
                ranks: [trip, pair, 0, 0, 0],
            };
        }
    }

    if let Some(s) = flush_suit {
        let mut ranks = [0u8; 5];
        for (slot, r) in mask_ranks_descending(suit_masks[s]).take(5).enumerate() {
            ranks[slot] = r;
        }
        return HandValue {
            category: Category::Flush,
            ranks,
        };
    }

    let all_mask = suit_masks.iter().fold(0u16, |m, &s| m | s);
    if let Some(high) = straight_high(all_mask) {
        return HandValue {
            category: Category::Straight,
            ranks: [high, 0, 0, 0, 0],
        };
    }

    if let Some(&trip) = trips.first() {
        let mut ranks = [trip, 0, 0, 0, 0];
        for (slot, r) in descending_ranks(&rank_counts)
            .filter(|&r| r != trip)
            .take(2)
            .enumerate()
        {
            ranks[slot + 1] = r;
        }
        return HandValue {
            category: Category::ThreeOfAKind,
            ranks,
        };
    }

    if pairs.len() >= 2 {
        let (high, low) = (pairs[0], pairs[1]);
        let kicker = descending_ranks(&rank_counts)
            .find(|&r| r != high && r != low)
            .unwrap_or(0);
        return HandValue {
            category: Category::TwoPair,
            ranks: [high, low, kicker, 0, 0],
        };
    }

    if let Some(&pair) = pairs.first() {
        let mut ranks = [pair, 0, 0, 0, 0];
        for (slot, r) in descending_ranks(&rank_counts)
            .filter(|&r| r != pair)
            .take(3)
            .enumerate()
        {
            ranks[slot + 1] = r;
        }
        return HandValue {
            category: Category::OnePair,
            ranks,
        };
    }

    let mut ranks = [0u8; 5];
    for (slot, r) in descending_ranks(&rank_counts).take(5).enumerate() {
        ranks[slot] = r;
    }
    HandValue {
        category: Category::HighCard,
        ranks,
    }
}

/// High card of the best straight in a rank bitmask, if any.
/// An ace doubles as rank 1 so the wheel comes out as 5-high.
fn straight_high(mask: u16) -> Option<u8> {
    let mut m = mask;
    if m & (1 << 14) != 0 {
        m |= 1 << 1;
    }
    (5..=14u8).rev().find(|&high| {
        let window = 0b11111u16 << (high - 4);
        m & window == window
    })
}

fn highest_with_count(rank_counts: &[u8; 15], count: u8) -> Option<u8> {
    (2..=14u8)
        .rev()
        .find(|&r| rank_counts[r as usize] == count)
}

/// Distinct ranks present, high to low.
fn descending_ranks(rank_counts: &[u8; 15]) -> impl Iterator<Item = u8> + '_ {
    (2..=14u8).rev().filter(|&r| rank_counts[r as usize] > 0)
}

fn mask_ranks_descending(mask: u16) -> impl Iterator<Item = u8> {
    (2..=14u8).rev().filter(move |&r| mask & (1 << r) != 0)
}
