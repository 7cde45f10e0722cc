//! User-facing strings in English and Arabic.

use crate::domain::Language;

pub struct Strings {
  pub generation_failed: &'static str,
  pub loading_submessage: &'static str,
  pub name_required: &'static str,
  pub invalid_email: &'static str,
  pub weak_password: &'static str,
  pub invalid_credential: &'static str,
  pub email_in_use: &'static str,
  pub profile_not_found: &'static str,
  pub storage_failure: &'static str,
  and_more: &'static str,
  lang: Language,
}

static EN: Strings = Strings {
  generation_failed: "Failed to generate the quiz. Please try a different category or try again later.",
  loading_submessage: "Our AI is crafting your questions. This may take a moment.",
  name_required: "Please enter your name.",
  invalid_email: "Please enter a valid email address.",
  weak_password: "Password must be at least 6 characters.",
  invalid_credential: "Invalid email or password.",
  email_in_use: "An account with this email already exists.",
  profile_not_found: "User profile not found.",
  storage_failure: "Could not save your data. Please try again.",
  and_more: "& more",
  lang: Language::En,
};

static AR: Strings = Strings {
  generation_failed: "فشل إنشاء الاختبار. يرجى تجربة فئة مختلفة أو المحاولة مرة أخرى لاحقًا.",
  loading_submessage: "يقوم الذكاء الاصطناعي بإعداد أسئلتك. قد يستغرق ذلك لحظة.",
  name_required: "يرجى إدخال اسمك.",
  invalid_email: "يرجى إدخال بريد إلكتروني صالح.",
  weak_password: "يجب أن تتكون كلمة المرور من 6 أحرف على الأقل.",
  invalid_credential: "البريد الإلكتروني أو كلمة المرور غير صحيحة.",
  email_in_use: "يوجد حساب مسجل بهذا البريد الإلكتروني بالفعل.",
  profile_not_found: "لم يتم العثور على الملف الشخصي.",
  storage_failure: "تعذر حفظ بياناتك. يرجى المحاولة مرة أخرى.",
  and_more: "والمزيد",
  lang: Language::Ar,
};

pub fn strings(lang: Language) -> &'static Strings {
  match lang {
    Language::En => &EN,
    Language::Ar => &AR,
  }
}

impl Strings {
  /// Up to two topics joined by a comma; longer lists are cut with "& more".
  pub fn topics_label(&self, topics: &[String]) -> String {
    if topics.len() > 2 {
      format!("{} {}", topics[..2].join(", "), self.and_more)
    } else {
      topics.join(", ")
    }
  }

  pub fn loading_message(&self, difficulty: &str, topics_label: &str) -> String {
    match self.lang {
      Language::En => format!("Generating your {difficulty} quiz on {topics_label}..."),
      Language::Ar => format!("جارٍ إنشاء اختبار {difficulty} حول {topics_label}..."),
    }
  }

  pub fn welcome(&self, name: &str) -> String {
    match self.lang {
      Language::En => format!("Welcome, {name}!"),
      Language::Ar => format!("أهلاً بك، {name}!"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn topics(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn topics_label_truncates_after_two() {
    let s = strings(Language::En);
    assert_eq!(s.topics_label(&topics(&["Football"])), "Football");
    assert_eq!(s.topics_label(&topics(&["Football", "Music"])), "Football, Music");
    assert_eq!(s.topics_label(&topics(&["Football", "Music", "Cuisine"])), "Football, Music & more");
  }

  #[test]
  fn loading_message_names_difficulty_and_topics() {
    let msg = strings(Language::En).loading_message("Hard", "Football, Music");
    assert!(msg.contains("Hard"));
    assert!(msg.contains("Football, Music"));
  }

  #[test]
  fn arabic_strings_differ_from_english() {
    assert_ne!(strings(Language::Ar).generation_failed, strings(Language::En).generation_failed);
    assert!(strings(Language::Ar).welcome("ليلى").contains("ليلى"));
  }
}
