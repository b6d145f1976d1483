use crate::content::Language;
use crate::segments::SegmentKey;

/// Display title and subtitle of one segment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLabel {
    pub title: &'static str,
    pub subtitle: &'static str,
}

/// Per-language titles for every slot.
#[derive(Debug, Clone, Copy)]
pub struct LabelTable {
    language: Language,
    labels: [SlotLabel; 8],
}

const fn label(title: &'static str, subtitle: &'static str) -> SlotLabel {
    SlotLabel { title, subtitle }
}

static ENGLISH: LabelTable = LabelTable {
    language: Language::English,
    labels: [
        label("Opening Prayers", "In the name of the Father"),
        label("Introduction", "The mystery"),
        label("Lectio", "Reading"),
        label("Commentary", "Understanding the text"),
        label("Meditatio", "Meditation"),
        label("Oratio", "Prayer"),
        label("Contemplatio", "Contemplation"),
        label("Actio", "Action"),
    ],
};

static SPANISH: LabelTable = LabelTable {
    language: Language::Spanish,
    labels: [
        label("Oraciones iniciales", "En el nombre del Padre"),
        label("Introducción", "El misterio"),
        label("Lectio", "Lectura"),
        label("Comentario", "Comprender el texto"),
        label("Meditatio", "Meditación"),
        label("Oratio", "Oración"),
        label("Contemplatio", "Contemplación"),
        label("Actio", "Acción"),
    ],
};

static PORTUGUESE: LabelTable = LabelTable {
    language: Language::Portuguese,
    labels: [
        label("Orações iniciais", "Em nome do Pai"),
        label("Introdução", "O mistério"),
        label("Lectio", "Leitura"),
        label("Comentário", "Compreender o texto"),
        label("Meditatio", "Meditação"),
        label("Oratio", "Oração"),
        label("Contemplatio", "Contemplação"),
        label("Actio", "Ação"),
    ],
};

static ITALIAN: LabelTable = LabelTable {
    language: Language::Italian,
    labels: [
        label("Preghiere iniziali", "Nel nome del Padre"),
        label("Introduzione", "Il mistero"),
        label("Lectio", "Lettura"),
        label("Commento", "Comprendere il testo"),
        label("Meditatio", "Meditazione"),
        label("Oratio", "Preghiera"),
        label("Contemplatio", "Contemplazione"),
        label("Actio", "Azione"),
    ],
};

static FRENCH: LabelTable = LabelTable {
    language: Language::French,
    labels: [
        label("Prières d'ouverture", "Au nom du Père"),
        label("Introduction", "Le mystère"),
        label("Lectio", "Lecture"),
        label("Commentaire", "Comprendre le texte"),
        label("Meditatio", "Méditation"),
        label("Oratio", "Prière"),
        label("Contemplatio", "Contemplation"),
        label("Actio", "Action"),
    ],
};

impl LabelTable {
    pub fn for_language(language: Language) -> &'static LabelTable {
        match language {
            Language::English => &ENGLISH,
            Language::Spanish => &SPANISH,
            Language::Portuguese => &PORTUGUESE,
            Language::Italian => &ITALIAN,
            Language::French => &FRENCH,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn get(&self, key: SegmentKey) -> SlotLabel {
        let index = match key {
            SegmentKey::Opening => 0,
            SegmentKey::Introduction => 1,
            SegmentKey::Lectio => 2,
            SegmentKey::Commentary => 3,
            SegmentKey::Meditatio => 4,
            SegmentKey::Oratio => 5,
            SegmentKey::Contemplatio => 6,
            SegmentKey::Actio => 7,
        };
        self.labels[index]
    }
}
