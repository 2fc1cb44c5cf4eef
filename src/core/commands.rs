use crate::render::PreviewFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteRef {
    Selected,
    /// 1-based position in the current listing.
    Index(usize),
    Name(String),
}

impl NoteRef {
    /// `None` means the current selection, `#n` an index, anything else a name.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return Self::Selected;
        };
        match raw.strip_prefix('#').and_then(|n| n.parse::<usize>().ok()) {
            Some(index) => Self::Index(index),
            None => Self::Name(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List {
        json: bool,
    },
    Show {
        target: NoteRef,
        json: bool,
    },
    Write {
        name: Option<String>,
        content: Option<String>,
    },
    Rename {
        from: NoteRef,
        to: String,
    },
    Delete(NoteRef),
    Preview {
        target: NoteRef,
        format: Option<PreviewFormat>,
    },
    Select(NoteRef),
    ShowRoot,
}
