//! Fixed set of expense categories and their button tokens.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    BahanPokok,
    MakananPokok,
    Jajanan,
    PengeluaranKampus,
    PengeluaranHimpunan,
    Bensin,
}

impl Category {
    /// Menu order.
    pub const ALL: [Category; 6] = [
        Category::BahanPokok,
        Category::MakananPokok,
        Category::Jajanan,
        Category::PengeluaranKampus,
        Category::PengeluaranHimpunan,
        Category::Bensin,
    ];

    /// Callback token carried by the category button.
    pub const fn token(self) -> &'static str {
        match self {
            Category::BahanPokok => "kat_bahan",
            Category::MakananPokok => "kat_makanan",
            Category::Jajanan => "kat_jajanan",
            Category::PengeluaranKampus => "kat_kampus",
            Category::PengeluaranHimpunan => "kat_himpunan",
            Category::Bensin => "kat_bensin",
        }
    }

    /// Label stored in the ledger and shown in confirmations.
    pub const fn label(self) -> &'static str {
        match self {
            Category::BahanPokok => "Bahan Pokok",
            Category::MakananPokok => "Makanan Pokok",
            Category::Jajanan => "Jajanan",
            Category::PengeluaranKampus => "Pengeluaran Kampus",
            Category::PengeluaranHimpunan => "Pengeluaran Himpunan",
            Category::Bensin => "Bensin",
        }
    }

    /// Caption on the category keyboard.
    pub const fn caption(self) -> &'static str {
        match self {
            Category::BahanPokok => "🍚 Bahan Pokok",
            Category::MakananPokok => "🍱 Makanan Pokok",
            Category::Jajanan => "🍩 Jajanan",
            Category::PengeluaranKampus => "🏫 Kampus",
            Category::PengeluaranHimpunan => "🎓 Himpunan",
            Category::Bensin => "⛽ Bensin",
        }
    }

    pub fn from_token(token: &str) -> Option<Category> {
        Self::ALL.into_iter().find(|c| c.token() == token)
    }

    pub fn from_label(label: &str) -> Option<Category> {
        let label = label.trim();
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Category::from_label(&label)
            .ok_or_else(|| de::Error::custom(format!("unknown category '{}'", label)))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
