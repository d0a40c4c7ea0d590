//! Built-in corpus of landmark U.S. Supreme Court cases.

use super::{DocumentStore, StoreError};
use crate::model::types::{Document, Year};

struct SampleCase {
    title: &'static str,
    content: &'static str,
    summary: &'static str,
    tags: &'static [&'static str],
    year: i32,
}

const SAMPLE_CASES: &[SampleCase] = &[
    SampleCase {
        title: "Miranda v. Arizona",
        content: "The Supreme Court held that the prosecution may not use statements arising from custodial interrogation of the defendant unless it demonstrates the use of procedural safeguards effective to secure the privilege against self-incrimination. The Court specified that before any custodial questioning, the person must be warned that they have the right to remain silent, that any statement they make may be used as evidence against them, and that they have the right to the presence of an attorney.",
        summary: "Established that police must inform suspects of their rights before custodial interrogation.",
        tags: &["Criminal Law", "Constitutional Law", "Police Procedure"],
        year: 1966,
    },
    SampleCase {
        title: "Gideon v. Wainwright",
        content: "The Supreme Court unanimously ruled that states are required under the Sixth Amendment to provide an attorney to defendants in criminal cases who are unable to afford their own attorneys. The case extended the right to counsel to indigent defendants in state courts, dramatically improving the quality of justice in the United States.",
        summary: "Established right to counsel for criminal defendants who cannot afford an attorney.",
        tags: &["Criminal Law", "Constitutional Law", "Right to Counsel"],
        year: 1963,
    },
    SampleCase {
        title: "Brown v. Board of Education",
        content: "The Supreme Court unanimously held that separate educational facilities are inherently unequal, effectively overturning Plessy v. Ferguson and the separate but equal doctrine. The Court found that segregation of children in public schools solely on the basis of race deprives children of the minority group of equal educational opportunities.",
        summary: "Ruled that racial segregation in public schools is unconstitutional.",
        tags: &["Civil Rights", "Constitutional Law", "Education Law"],
        year: 1954,
    },
    SampleCase {
        title: "Mapp v. Ohio",
        content: "The Supreme Court ruled that evidence obtained in violation of the Fourth Amendment protection against unreasonable searches and seizures may not be used in state law criminal prosecutions in state courts, as well as federal criminal law prosecutions in federal courts. This doctrine is known as the exclusionary rule.",
        summary: "Extended the exclusionary rule to state courts, prohibiting the use of illegally obtained evidence.",
        tags: &["Criminal Law", "Constitutional Law", "Search and Seizure"],
        year: 1961,
    },
    SampleCase {
        title: "Terry v. Ohio",
        content: "The Supreme Court held that the Fourth Amendment prohibition on unreasonable searches and seizures is not violated when a police officer stops a suspect on the street and frisks them without probable cause to arrest, if the police officer has a reasonable suspicion that the person has committed, is committing, or is about to commit a crime and has a reasonable belief that the person may be armed and presently dangerous.",
        summary: "Established the standard for stop and frisk procedures by police.",
        tags: &["Criminal Law", "Constitutional Law", "Police Procedure"],
        year: 1968,
    },
    SampleCase {
        title: "Roe v. Wade",
        content: "The Supreme Court ruled that the Constitution of the United States protects a pregnant woman's liberty to choose to have an abortion without excessive government restriction. The decision struck down many federal and state abortion laws, and it caused an ongoing abortion debate in the United States about whether, or to what extent, abortion should be legal.",
        summary: "Established constitutional right to abortion under the Due Process Clause of the Fourteenth Amendment.",
        tags: &["Constitutional Law", "Privacy Rights", "Due Process"],
        year: 1973,
    },
    SampleCase {
        title: "Marbury v. Madison",
        content: "The Supreme Court established the principle of judicial review, which gives the Court the power to declare acts of Congress unconstitutional. Chief Justice John Marshall wrote that it is the duty of the judicial department to say what the law is, establishing the Court as the final arbiter of constitutional questions.",
        summary: "Established the principle of judicial review in the United States.",
        tags: &["Constitutional Law", "Judicial Review", "Separation of Powers"],
        year: 1803,
    },
];

/// Store that always yields the seven built-in cases.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleStore;

impl SampleStore {
    pub fn new() -> Self {
        Self
    }

    /// The built-in cases as documents, ids `"1"` through `"7"`.
    pub fn documents() -> Vec<Document> {
        SAMPLE_CASES
            .iter()
            .enumerate()
            .map(|(index, case)| Document {
                id: (index + 1).to_string(),
                title: case.title.to_string(),
                content: case.content.to_string(),
                summary: Some(case.summary.to_string()),
                tags: case.tags.iter().map(|t| t.to_string()).collect(),
                year: Year::Known(case.year),
                jurisdiction: Some("US Supreme Court".to_string()),
                doc_type: Some("case".to_string()),
                citation: None,
            })
            .collect()
    }
}

impl DocumentStore for SampleStore {
    fn name(&self) -> String {
        "samples".to_string()
    }

    fn load(&self) -> Result<Vec<Document>, StoreError> {
        Ok(Self::documents())
    }
}
