use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    FirstName,
    LastName,
    PublicHealthCardNumber,
    DateOfBirth,
    PhoneNumber,
    BestTimeToCall,
    CanLeaveVoiceMail,
    Address,
    City,
    PostalCode,
    Province,
    Email,
    Physician,
    OnTherapies,
    TherapyType,
    OtherTherapy,
    PrimaryInsuranceProvider,
    InsurerContract,
    InsurerCertificate,
    Signature,
    PatientSignatureDate,
    PatientPrintedName,
    RelationshipToPatient,
    VerbalConsent,
    VerbalConsentObtainedBy,
    VerbalConsentDate,
}

impl FieldId {
    pub const ALL: [FieldId; 26] = [
        Self::FirstName,
        Self::LastName,
        Self::PublicHealthCardNumber,
        Self::DateOfBirth,
        Self::PhoneNumber,
        Self::BestTimeToCall,
        Self::CanLeaveVoiceMail,
        Self::Address,
        Self::City,
        Self::PostalCode,
        Self::Province,
        Self::Email,
        Self::Physician,
        Self::OnTherapies,
        Self::TherapyType,
        Self::OtherTherapy,
        Self::PrimaryInsuranceProvider,
        Self::InsurerContract,
        Self::InsurerCertificate,
        Self::Signature,
        Self::PatientSignatureDate,
        Self::PatientPrintedName,
        Self::RelationshipToPatient,
        Self::VerbalConsent,
        Self::VerbalConsentObtainedBy,
        Self::VerbalConsentDate,
    ];

    pub fn descriptor(self) -> &'static FieldDescriptor {
        &FIELDS[self as usize]
    }

    /// Key used in values documents (`firstName`, `dateOfBirth`, ...).
    pub fn key(self) -> &'static str {
        self.descriptor().key
    }

    pub fn label(self) -> &'static str {
        self.descriptor().label
    }

    pub fn kind(self) -> FieldKind {
        self.descriptor().kind
    }

    pub fn from_key(key: &str) -> Option<Self> {
        FIELDS.iter().find(|field| field.key == key).map(|field| field.id)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceOption {
    pub label: &'static str,
    pub value: &'static str,
}

impl ChoiceOption {
    pub const fn new(label: &'static str, value: &'static str) -> Self {
        Self { label, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Calendar date entered as `YYYY-MM-DD`.
    Date,
    /// Radio group: at most one option.
    SingleChoice(&'static [ChoiceOption]),
    /// Checkbox group: any subset of the options.
    MultiChoice(&'static [ChoiceOption]),
    /// A single checkbox.
    Flag,
    Signature,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Date => "date",
            Self::SingleChoice(_) => "single choice",
            Self::MultiChoice(_) => "multiple choice",
            Self::Flag => "flag",
            Self::Signature => "signature",
        }
    }

    pub fn options(self) -> &'static [ChoiceOption] {
        match self {
            Self::SingleChoice(options) | Self::MultiChoice(options) => options,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub id: FieldId,
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Column name on the external list.
    pub column: &'static str,
}

impl FieldDescriptor {
    const fn new(
        id: FieldId,
        key: &'static str,
        label: &'static str,
        kind: FieldKind,
        column: &'static str,
    ) -> Self {
        Self {
            id,
            key,
            label,
            kind,
            column,
        }
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.kind.options().iter().any(|option| option.value == value)
    }
}

pub const OTHER_THERAPY: &str = "Other";

const CALL_TIMES: &[ChoiceOption] = &[
    ChoiceOption::new("Morning", "morning"),
    ChoiceOption::new("Noon", "noon"),
    ChoiceOption::new("Evening", "evening"),
];

const YES_NO: &[ChoiceOption] = &[
    ChoiceOption::new("Yes", "yes"),
    ChoiceOption::new("No", "no"),
];

const THERAPIES: &[ChoiceOption] = &[
    ChoiceOption::new("Aubagio (Teriflunimide)", "Aubagio (Teriflunimide)"),
    ChoiceOption::new("Enspryng (Satralizumab)", "Enspryng (Satralizumab)"),
    ChoiceOption::new("Gilenya (Fingolimod)", "Gilenya (Fingolimod)"),
    ChoiceOption::new("Kesimpta (Ofatumumab)", "Kesimpta (Ofatumumab)"),
    ChoiceOption::new("Lemtrada (Alemtuzumab)", "Lemtrada (Alemtuzumab)"),
    ChoiceOption::new("Mavenclad (Cladribine)", "Mavenclad (Cladribine)"),
    ChoiceOption::new("Ocrevus (Ocrelizumab)", "Ocrevus (Ocrelizumab)"),
    ChoiceOption::new("Riximyo/Ruxience (Rituximab)", "Riximyo/Ruxience (Rituximab)"),
    ChoiceOption::new("Tecfidera (Dimethyl Fumarate)", "Tecfidera (Dimethyl Fumarate)"),
    ChoiceOption::new("Tysabri (Natalizumab)", "Tysabri (Natalizumab)"),
    ChoiceOption::new("Other", OTHER_THERAPY),
];

/// Every field the form collects, in render order. Indexed by `FieldId as usize`.
pub static FIELDS: [FieldDescriptor; 26] = [
    FieldDescriptor::new(FieldId::FirstName, "firstName", "First Name", FieldKind::Text, "Title"),
    FieldDescriptor::new(FieldId::LastName, "lastName", "Last Name", FieldKind::Text, "LastName"),
    FieldDescriptor::new(
        FieldId::PublicHealthCardNumber,
        "publicHealthCardNumber",
        "Public Health Card Number",
        FieldKind::Text,
        "PublicHealthCardNumber",
    ),
    FieldDescriptor::new(
        FieldId::DateOfBirth,
        "dateOfBirth",
        "Date of Birth",
        FieldKind::Date,
        "DateOfBirth",
    ),
    FieldDescriptor::new(
        FieldId::PhoneNumber,
        "phoneNumber",
        "Phone Number",
        FieldKind::Text,
        "PhoneNumber",
    ),
    FieldDescriptor::new(
        FieldId::BestTimeToCall,
        "bestTimeToCall",
        "Best Time to Call",
        FieldKind::MultiChoice(CALL_TIMES),
        "BestTimeToCall",
    ),
    FieldDescriptor::new(
        FieldId::CanLeaveVoiceMail,
        "canLeaveVoiceMail",
        "Can leave a voice mail",
        FieldKind::SingleChoice(YES_NO),
        "CanLeaveVoiceMail",
    ),
    FieldDescriptor::new(FieldId::Address, "address", "Address", FieldKind::Text, "Address"),
    FieldDescriptor::new(FieldId::City, "city", "City", FieldKind::Text, "City"),
    FieldDescriptor::new(
        FieldId::PostalCode,
        "postalCode",
        "Postal Code",
        FieldKind::Text,
        "PostalCode",
    ),
    FieldDescriptor::new(FieldId::Province, "province", "Province", FieldKind::Text, "Province"),
    FieldDescriptor::new(FieldId::Email, "email", "Email", FieldKind::Text, "Email"),
    FieldDescriptor::new(
        FieldId::Physician,
        "physician",
        "Physician Name",
        FieldKind::Text,
        "Physician",
    ),
    FieldDescriptor::new(
        FieldId::OnTherapies,
        "therapies",
        "Are you on Multiple Sclerosis/Neuromyelitis Optica Therapies",
        FieldKind::SingleChoice(YES_NO),
        "OnTherapies",
    ),
    FieldDescriptor::new(
        FieldId::TherapyType,
        "typeOfTherapies",
        "If Yes, please select from below",
        FieldKind::SingleChoice(THERAPIES),
        "TypeOfTherapy",
    ),
    FieldDescriptor::new(
        FieldId::OtherTherapy,
        "otherTherapy",
        "Other therapy",
        FieldKind::Text,
        "OtherTherapy",
    ),
    FieldDescriptor::new(
        FieldId::PrimaryInsuranceProvider,
        "primaryInsuranceProvider",
        "Primary Insurance Provider",
        FieldKind::Text,
        "PrimaryInsuranceProvider",
    ),
    FieldDescriptor::new(
        FieldId::InsurerContract,
        "insurerContract",
        "Insurer Contract #",
        FieldKind::Text,
        "InsurerContract",
    ),
    FieldDescriptor::new(
        FieldId::InsurerCertificate,
        "insurerCertificate",
        "Insurer Certificate #",
        FieldKind::Text,
        "InsurerCertificate",
    ),
    FieldDescriptor::new(
        FieldId::Signature,
        "signature",
        "Patient's Signature",
        FieldKind::Signature,
        "SignatureData",
    ),
    FieldDescriptor::new(
        FieldId::PatientSignatureDate,
        "patientSignatureDate",
        "Date of Patient's Signature",
        FieldKind::Date,
        "PatientSignatureDate",
    ),
    FieldDescriptor::new(
        FieldId::PatientPrintedName,
        "patientPrintedNameOrSDM",
        "Printed Name of Patient or Patient's SDM",
        FieldKind::Text,
        "PatientPrintedNameOrSDM",
    ),
    FieldDescriptor::new(
        FieldId::RelationshipToPatient,
        "relationshipToPatient",
        "Relationship of SDM to Patient",
        FieldKind::Text,
        "RelationshipToPatient",
    ),
    FieldDescriptor::new(
        FieldId::VerbalConsent,
        "verbalConsent",
        "Verbal Consent Obtained: I have read the above consent to Patient",
        FieldKind::Flag,
        "VerbalConsent",
    ),
    FieldDescriptor::new(
        FieldId::VerbalConsentObtainedBy,
        "verbalConsentObtainedBy",
        "Verbal Consent Obtained By",
        FieldKind::Text,
        "VerbalConsentObtainedBy",
    ),
    FieldDescriptor::new(
        FieldId::VerbalConsentDate,
        "verbalConsentDate",
        "Date of Verbal Consent",
        FieldKind::Date,
        "VerbalConsentDate",
    ),
];

#[cfg(test)]
mod tests {
    use super::{FIELDS, FieldId, FieldKind};
    use std::collections::HashSet;

    #[test]
    fn registry_order_matches_field_ids() {
        for (index, id) in FieldId::ALL.iter().enumerate() {
            assert_eq!(FIELDS[index].id, *id);
            assert_eq!(id.descriptor().id, *id);
        }
    }

    #[test]
    fn keys_and_columns_are_unique() {
        let keys: HashSet<_> = FIELDS.iter().map(|f| f.key).collect();
        let columns: HashSet<_> = FIELDS.iter().map(|f| f.column).collect();
        assert_eq!(keys.len(), FIELDS.len());
        assert_eq!(columns.len(), FIELDS.len());
    }

    #[test]
    fn from_key_resolves_document_names() {
        assert_eq!(FieldId::from_key("firstName"), Some(FieldId::FirstName));
        assert_eq!(
            FieldId::from_key("patientPrintedNameOrSDM"),
            Some(FieldId::PatientPrintedName)
        );
        assert_eq!(FieldId::from_key("nope"), None);
    }

    #[test]
    fn first_name_and_address_keep_list_columns() {
        assert_eq!(FieldId::FirstName.descriptor().column, "Title");
        assert_eq!(FieldId::Address.descriptor().column, "Address");
        assert_eq!(FieldId::Signature.descriptor().column, "SignatureData");
    }

    #[test]
    fn choice_fields_expose_options() {
        assert!(matches!(FieldId::BestTimeToCall.kind(), FieldKind::MultiChoice(_)));
        assert_eq!(FieldId::BestTimeToCall.kind().options().len(), 3);
        assert!(FieldId::TherapyType.descriptor().has_option("Other"));
        assert!(!FieldId::CanLeaveVoiceMail.descriptor().has_option("maybe"));
    }
}
