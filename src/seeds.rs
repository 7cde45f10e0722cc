//! Seed data: built-in categories, difficulties, and an offline question bank.
//!
//! The bank keeps the app playable without an API key; every entry must pass
//! `Question::is_well_formed`.

use rand::{seq::SliceRandom, Rng};

use crate::domain::{Category, Language, Question};

fn category(name: &str, subs: &[&str]) -> Category {
  Category {
    name: name.into(),
    subcategories: subs.iter().map(|s| s.to_string()).collect(),
  }
}

/// A bank question tagged with the catalog topic and difficulty it fits.
#[derive(Clone, Debug)]
pub struct SeedQuestion {
  pub topic: &'static str,
  pub difficulty: &'static str,
  pub question: Question,
}

fn q(topic: &'static str, difficulty: &'static str, text: &str, options: [&str; 4], correct: &str) -> SeedQuestion {
  SeedQuestion {
    topic,
    difficulty,
    question: Question {
      question: text.into(),
      options: options.iter().map(|s| s.to_string()).collect(),
      correct_answer: correct.into(),
    },
  }
}

pub fn seed_categories(lang: Language) -> Vec<Category> {
  match lang {
    Language::En => vec![
      category("History", &["Ancient Civilizations", "Islamic Golden Age", "Modern History"]),
      category("Geography", &["Capitals", "Landmarks", "Rivers & Deserts"]),
      category("Culture", &["Cuisine", "Music", "Literature & Poetry"]),
      category("Science", &["Astronomy", "Medicine", "Inventions"]),
      category("Sports", &["Football", "Olympic Games"]),
    ],
    Language::Ar => vec![
      category("التاريخ", &["الحضارات القديمة", "العصر الذهبي الإسلامي", "التاريخ الحديث"]),
      category("الجغرافيا", &["العواصم", "المعالم", "الأنهار والصحاري"]),
      category("الثقافة", &["المطبخ", "الموسيقى", "الأدب والشعر"]),
      category("العلوم", &["علم الفلك", "الطب", "الاختراعات"]),
      category("الرياضة", &["كرة القدم", "الألعاب الأولمبية"]),
    ],
  }
}

pub fn seed_difficulties(lang: Language) -> Vec<String> {
  let list: [&str; 3] = match lang {
    Language::En => ["Easy", "Medium", "Hard"],
    Language::Ar => ["سهل", "متوسط", "صعب"],
  };
  list.iter().map(|s| s.to_string()).collect()
}

/// Offline bank served when no generation API is configured.
pub fn seed_questions(lang: Language) -> Vec<SeedQuestion> {
  match lang {
    Language::En => vec![
      q("Rivers & Deserts", "Easy", "Which river flows through Cairo?", ["Nile", "Tigris", "Euphrates", "Jordan"], "Nile"),
      q("Capitals", "Easy", "What is the capital of Morocco?", ["Casablanca", "Rabat", "Marrakesh", "Fes"], "Rabat"),
      q(
        "Ancient Civilizations",
        "Medium",
        "Which rock-cut city was the capital of the Nabataeans?",
        ["Palmyra", "Byblos", "Petra", "Carthage"],
        "Petra",
      ),
      q(
        "Islamic Golden Age",
        "Medium",
        "Who wrote \"The Muqaddimah\"?",
        ["Ibn Sina", "Ibn Khaldun", "Al-Khwarizmi", "Ibn Rushd"],
        "Ibn Khaldun",
      ),
      q(
        "Islamic Golden Age",
        "Hard",
        "Whose name gave us the word \"algorithm\"?",
        ["Al-Biruni", "Omar Khayyam", "Al-Kindi", "Al-Khwarizmi"],
        "Al-Khwarizmi",
      ),
      q("Landmarks", "Easy", "In which city is the Burj Khalifa?", ["Abu Dhabi", "Doha", "Dubai", "Riyadh"], "Dubai"),
      q(
        "Football",
        "Easy",
        "Which country hosted the 2022 FIFA World Cup?",
        ["Qatar", "Saudi Arabia", "UAE", "Morocco"],
        "Qatar",
      ),
      q(
        "Rivers & Deserts",
        "Easy",
        "What is the largest hot desert in the world?",
        ["Kalahari", "Sahara", "Gobi", "Atacama"],
        "Sahara",
      ),
      q(
        "Music",
        "Medium",
        "Which singer was known as \"the Star of the East\"?",
        ["Fairuz", "Warda", "Asmahan", "Umm Kulthum"],
        "Umm Kulthum",
      ),
      q(
        "Ancient Civilizations",
        "Medium",
        "Ancient Carthage lies in which present-day country?",
        ["Libya", "Tunisia", "Algeria", "Egypt"],
        "Tunisia",
      ),
      q(
        "Football",
        "Medium",
        "Which Arab team reached the semi-finals of the 2022 World Cup?",
        ["Tunisia", "Saudi Arabia", "Morocco", "Egypt"],
        "Morocco",
      ),
      q(
        "Medicine",
        "Hard",
        "Who wrote \"The Canon of Medicine\"?",
        ["Ibn Sina", "Al-Razi", "Ibn al-Nafis", "Al-Zahrawi"],
        "Ibn Sina",
      ),
      q(
        "Astronomy",
        "Hard",
        "Which star's name comes from the Arabic for \"the follower\"?",
        ["Aldebaran", "Altair", "Deneb", "Rigel"],
        "Aldebaran",
      ),
      q(
        "Cuisine",
        "Easy",
        "Which dish of steamed semolina is a staple across the Maghreb?",
        ["Couscous", "Mansaf", "Kabsa", "Koshari"],
        "Couscous",
      ),
    ],
    Language::Ar => vec![
      q("الأنهار والصحاري", "سهل", "ما هو النهر الذي يمر عبر القاهرة؟", ["النيل", "دجلة", "الفرات", "الأردن"], "النيل"),
      q("العواصم", "سهل", "ما هي عاصمة المغرب؟", ["الدار البيضاء", "الرباط", "مراكش", "فاس"], "الرباط"),
      q(
        "العصر الذهبي الإسلامي",
        "متوسط",
        "من هو مؤلف كتاب \"المقدمة\"؟",
        ["ابن سينا", "ابن خلدون", "الخوارزمي", "ابن رشد"],
        "ابن خلدون",
      ),
      q("المعالم", "سهل", "في أي مدينة يقع برج خليفة؟", ["أبوظبي", "الدوحة", "دبي", "الرياض"], "دبي"),
      q("كرة القدم", "سهل", "أي دولة استضافت كأس العالم 2022؟", ["قطر", "السعودية", "الإمارات", "المغرب"], "قطر"),
      q(
        "الأنهار والصحاري",
        "سهل",
        "ما هي أكبر صحراء حارة في العالم؟",
        ["صحراء كالاهاري", "الصحراء الكبرى", "صحراء غوبي", "صحراء أتاكاما"],
        "الصحراء الكبرى",
      ),
      q("الموسيقى", "متوسط", "من هي المطربة الملقبة بكوكب الشرق؟", ["فيروز", "وردة", "أسمهان", "أم كلثوم"], "أم كلثوم"),
      q("الحضارات القديمة", "متوسط", "في أي دولة حالية تقع قرطاج القديمة؟", ["ليبيا", "تونس", "الجزائر", "مصر"], "تونس"),
      q(
        "الحضارات القديمة",
        "متوسط",
        "ما هي المدينة المنحوتة في الصخر التي كانت عاصمة الأنباط؟",
        ["تدمر", "جبيل", "البتراء", "بعلبك"],
        "البتراء",
      ),
      q(
        "الطب",
        "صعب",
        "من هو مؤلف كتاب \"القانون في الطب\"؟",
        ["ابن سينا", "الرازي", "ابن النفيس", "الزهراوي"],
        "ابن سينا",
      ),
      q(
        "علم الفلك",
        "صعب",
        "أي نجم يعني اسمه بالعربية \"التابع\"؟",
        ["الدبران", "النسر الطائر", "ذنب الدجاجة", "رجل الجبار"],
        "الدبران",
      ),
      q("المطبخ", "سهل", "ما هو طبق السميد المطهو بالبخار المنتشر في المغرب العربي؟", ["الكسكس", "المنسف", "الكبسة", "الكشري"], "الكسكس"),
    ],
  }
}

/// Up to `count` bank questions for a request. Entries matching both topic and
/// difficulty come first, then topic-only, then difficulty-only, then the rest;
/// order inside each group is random.
pub fn pick_offline<R: Rng + ?Sized>(
  lang: Language,
  topics: &[String],
  difficulty: &str,
  count: usize,
  rng: &mut R,
) -> Vec<Question> {
  let mut bank = seed_questions(lang);
  bank.shuffle(rng);
  // Stable sort: the shuffle survives within each group.
  bank.sort_by_key(|s| {
    let topic = topics.iter().any(|t| t == s.topic);
    let level = s.difficulty == difficulty;
    match (topic, level) {
      (true, true) => 0,
      (true, false) => 1,
      (false, true) => 2,
      (false, false) => 3,
    }
  });
  bank.into_iter().take(count).map(|s| s.question).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn offline_bank_is_well_formed() {
    for lang in Language::ALL {
      let bank = seed_questions(lang);
      assert!(bank.len() >= 10, "{lang:?} bank too small");
      for seed in &bank {
        assert!(seed.question.is_well_formed(), "malformed seed: {}", seed.question.question);
      }
    }
  }

  #[test]
  fn every_language_has_categories_and_difficulties() {
    for lang in Language::ALL {
      assert!(!seed_categories(lang).is_empty());
      assert_eq!(seed_difficulties(lang).len(), 3);
    }
  }

  #[test]
  fn bank_tags_exist_in_the_catalog() {
    for lang in Language::ALL {
      let topics: Vec<String> = seed_categories(lang).into_iter().flat_map(|c| c.subcategories).collect();
      let levels = seed_difficulties(lang);
      for seed in seed_questions(lang) {
        assert!(topics.iter().any(|t| t == seed.topic), "unknown topic {}", seed.topic);
        assert!(levels.iter().any(|d| d == seed.difficulty), "unknown difficulty {}", seed.difficulty);
      }
    }
  }

  #[test]
  fn offline_pick_prefers_topic_and_difficulty() {
    let mut rng = rand::thread_rng();
    let picked = pick_offline(Language::En, &["Astronomy".to_string()], "Hard", 1, &mut rng);
    assert_eq!(picked.len(), 1);
    assert_eq!(picked[0].correct_answer, "Aldebaran");

    let football = pick_offline(Language::En, &["Football".to_string()], "Hard", 2, &mut rng);
    let mut answers: Vec<&str> = football.iter().map(|q| q.correct_answer.as_str()).collect();
    answers.sort();
    assert_eq!(answers, vec!["Morocco", "Qatar"]);
  }

  #[test]
  fn offline_pick_fills_up_from_the_rest() {
    let mut rng = rand::thread_rng();
    let picked = pick_offline(Language::Ar, &["علم الفلك".to_string()], "صعب", 5, &mut rng);
    assert_eq!(picked.len(), 5);
    assert_eq!(picked[0].correct_answer, "الدبران");
  }
}
