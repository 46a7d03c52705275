//! Built-in chapter table
//!
//! Names are transliterated; verse counts follow the Hafs numbering used by
//! the recitation audio sets.

use tilawah_core::Revelation::{Meccan, Medinan};
use tilawah_core::{ChapterMeta, Revelation, VerseIdentity, CHAPTER_COUNT};

/// Total number of verses across all chapters
pub const TOTAL_VERSES: u32 = 6236;

struct ChapterEntry {
    name: &'static str,
    english_name: &'static str,
    verse_count: u16,
    revelation: Revelation,
}

const fn entry(
    name: &'static str,
    english_name: &'static str,
    verse_count: u16,
    revelation: Revelation,
) -> ChapterEntry {
    ChapterEntry {
        name,
        english_name,
        verse_count,
        revelation,
    }
}

static CHAPTERS: [ChapterEntry; CHAPTER_COUNT as usize] = [
    entry("Al-Fatihah", "The Opening", 7, Meccan),
    entry("Al-Baqarah", "The Cow", 286, Medinan),
    entry("Ali 'Imran", "Family of Imran", 200, Medinan),
    entry("An-Nisa", "The Women", 176, Medinan),
    entry("Al-Ma'idah", "The Table Spread", 120, Medinan),
    entry("Al-An'am", "The Cattle", 165, Meccan),
    entry("Al-A'raf", "The Heights", 206, Meccan),
    entry("Al-Anfal", "The Spoils of War", 75, Medinan),
    entry("At-Tawbah", "The Repentance", 129, Medinan),
    entry("Yunus", "Jonah", 109, Meccan),
    entry("Hud", "Hud", 123, Meccan),
    entry("Yusuf", "Joseph", 111, Meccan),
    entry("Ar-Ra'd", "The Thunder", 43, Medinan),
    entry("Ibrahim", "Abraham", 52, Meccan),
    entry("Al-Hijr", "The Rocky Tract", 99, Meccan),
    entry("An-Nahl", "The Bee", 128, Meccan),
    entry("Al-Isra", "The Night Journey", 111, Meccan),
    entry("Al-Kahf", "The Cave", 110, Meccan),
    entry("Maryam", "Mary", 98, Meccan),
    entry("Taha", "Ta-Ha", 135, Meccan),
    entry("Al-Anbya", "The Prophets", 112, Meccan),
    entry("Al-Hajj", "The Pilgrimage", 78, Medinan),
    entry("Al-Mu'minun", "The Believers", 118, Meccan),
    entry("An-Nur", "The Light", 64, Medinan),
    entry("Al-Furqan", "The Criterion", 77, Meccan),
    entry("Ash-Shu'ara", "The Poets", 227, Meccan),
    entry("An-Naml", "The Ant", 93, Meccan),
    entry("Al-Qasas", "The Stories", 88, Meccan),
    entry("Al-'Ankabut", "The Spider", 69, Meccan),
    entry("Ar-Rum", "The Romans", 60, Meccan),
    entry("Luqman", "Luqman", 34, Meccan),
    entry("As-Sajdah", "The Prostration", 30, Meccan),
    entry("Al-Ahzab", "The Combined Forces", 73, Medinan),
    entry("Saba", "Sheba", 54, Meccan),
    entry("Fatir", "Originator", 45, Meccan),
    entry("Ya-Sin", "Ya Sin", 83, Meccan),
    entry("As-Saffat", "Those who set the Ranks", 182, Meccan),
    entry("Sad", "The Letter Saad", 88, Meccan),
    entry("Az-Zumar", "The Troops", 75, Meccan),
    entry("Ghafir", "The Forgiver", 85, Meccan),
    entry("Fussilat", "Explained in Detail", 54, Meccan),
    entry("Ash-Shuraa", "The Consultation", 53, Meccan),
    entry("Az-Zukhruf", "The Ornaments of Gold", 89, Meccan),
    entry("Ad-Dukhan", "The Smoke", 59, Meccan),
    entry("Al-Jathiyah", "The Crouching", 37, Meccan),
    entry("Al-Ahqaf", "The Wind-Curved Sandhills", 35, Meccan),
    entry("Muhammad", "Muhammad", 38, Medinan),
    entry("Al-Fath", "The Victory", 29, Medinan),
    entry("Al-Hujurat", "The Rooms", 18, Medinan),
    entry("Qaf", "The Letter Qaf", 45, Meccan),
    entry("Adh-Dhariyat", "The Winnowing Winds", 60, Meccan),
    entry("At-Tur", "The Mount", 49, Meccan),
    entry("An-Najm", "The Star", 62, Meccan),
    entry("Al-Qamar", "The Moon", 55, Meccan),
    entry("Ar-Rahman", "The Beneficent", 78, Medinan),
    entry("Al-Waqi'ah", "The Inevitable", 96, Meccan),
    entry("Al-Hadid", "The Iron", 29, Medinan),
    entry("Al-Mujadila", "The Pleading Woman", 22, Medinan),
    entry("Al-Hashr", "The Exile", 24, Medinan),
    entry("Al-Mumtahanah", "She that is to be examined", 13, Medinan),
    entry("As-Saf", "The Ranks", 14, Medinan),
    entry("Al-Jumu'ah", "The Congregation, Friday", 11, Medinan),
    entry("Al-Munafiqun", "The Hypocrites", 11, Medinan),
    entry("At-Taghabun", "The Mutual Disillusion", 18, Medinan),
    entry("At-Talaq", "The Divorce", 12, Medinan),
    entry("At-Tahrim", "The Prohibition", 12, Medinan),
    entry("Al-Mulk", "The Sovereignty", 30, Meccan),
    entry("Al-Qalam", "The Pen", 52, Meccan),
    entry("Al-Haqqah", "The Reality", 52, Meccan),
    entry("Al-Ma'arij", "The Ascending Stairways", 44, Meccan),
    entry("Nuh", "Noah", 28, Meccan),
    entry("Al-Jinn", "The Jinn", 28, Meccan),
    entry("Al-Muzzammil", "The Enshrouded One", 20, Meccan),
    entry("Al-Muddaththir", "The Cloaked One", 56, Meccan),
    entry("Al-Qiyamah", "The Resurrection", 40, Meccan),
    entry("Al-Insan", "Man", 31, Medinan),
    entry("Al-Mursalat", "The Emissaries", 50, Meccan),
    entry("An-Naba", "The Tidings", 40, Meccan),
    entry("An-Nazi'at", "Those who drag forth", 46, Meccan),
    entry("'Abasa", "He Frowned", 42, Meccan),
    entry("At-Takwir", "The Overthrowing", 29, Meccan),
    entry("Al-Infitar", "The Cleaving", 19, Meccan),
    entry("Al-Mutaffifin", "The Defrauding", 36, Meccan),
    entry("Al-Inshiqaq", "The Sundering", 25, Meccan),
    entry("Al-Buruj", "The Mansions of the Stars", 22, Meccan),
    entry("At-Tariq", "The Nightcomer", 17, Meccan),
    entry("Al-A'la", "The Most High", 19, Meccan),
    entry("Al-Ghashiyah", "The Overwhelming", 26, Meccan),
    entry("Al-Fajr", "The Dawn", 30, Meccan),
    entry("Al-Balad", "The City", 20, Meccan),
    entry("Ash-Shams", "The Sun", 15, Meccan),
    entry("Al-Layl", "The Night", 21, Meccan),
    entry("Ad-Duhaa", "The Morning Hours", 11, Meccan),
    entry("Ash-Sharh", "The Relief", 8, Meccan),
    entry("At-Tin", "The Fig", 8, Meccan),
    entry("Al-'Alaq", "The Clot", 19, Meccan),
    entry("Al-Qadr", "The Power", 5, Meccan),
    entry("Al-Bayyinah", "The Clear Proof", 8, Medinan),
    entry("Az-Zalzalah", "The Earthquake", 8, Medinan),
    entry("Al-'Adiyat", "The Courser", 11, Meccan),
    entry("Al-Qari'ah", "The Calamity", 11, Meccan),
    entry("At-Takathur", "The Rivalry in World Increase", 8, Meccan),
    entry("Al-'Asr", "The Declining Day", 3, Meccan),
    entry("Al-Humazah", "The Traducer", 9, Meccan),
    entry("Al-Fil", "The Elephant", 5, Meccan),
    entry("Quraysh", "Quraysh", 4, Meccan),
    entry("Al-Ma'un", "The Small Kindnesses", 7, Meccan),
    entry("Al-Kawthar", "The Abundance", 3, Meccan),
    entry("Al-Kafirun", "The Disbelievers", 6, Meccan),
    entry("An-Nasr", "The Divine Support", 3, Medinan),
    entry("Al-Masad", "The Palm Fiber", 5, Meccan),
    entry("Al-Ikhlas", "The Sincerity", 4, Meccan),
    entry("Al-Falaq", "The Daybreak", 5, Meccan),
    entry("An-Nas", "Mankind", 6, Meccan),
];

fn lookup(id: u16) -> Option<&'static ChapterEntry> {
    if id == 0 {
        return None;
    }
    CHAPTERS.get(usize::from(id - 1))
}

/// Metadata for chapter `id`, or `None` outside `1..=114`
pub fn chapter_meta(id: u16) -> Option<ChapterMeta> {
    lookup(id).map(|entry| ChapterMeta {
        id,
        name: entry.name.to_string(),
        english_name: entry.english_name.to_string(),
        verse_count: entry.verse_count,
        revelation: entry.revelation,
    })
}

/// Number of verses in chapter `id`
pub fn verse_count(id: u16) -> Option<u16> {
    lookup(id).map(|entry| entry.verse_count)
}

/// Metadata for every chapter, in order
pub fn all_chapters() -> Vec<ChapterMeta> {
    (1..=CHAPTER_COUNT).filter_map(chapter_meta).collect()
}

/// True if the verse exists in the chapter table
pub fn contains(identity: VerseIdentity) -> bool {
    verse_count(identity.chapter)
        .map(|count| identity.verse >= 1 && identity.verse <= count)
        .unwrap_or(false)
}

/// The verse after `identity` in the same chapter, if there is one
pub fn next_in_chapter(identity: VerseIdentity) -> Option<VerseIdentity> {
    let count = verse_count(identity.chapter)?;
    if identity.verse >= 1 && identity.verse < count {
        Some(identity.next())
    } else {
        None
    }
}
