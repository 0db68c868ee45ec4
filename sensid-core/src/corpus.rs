//! # Textos de Demonstração
//!
//! Pequenos documentos sintéticos usados pela interface e pelos testes. Todos
//! os números são inventados.

/// Pares `(domínio, texto)` para demonstração.
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Veteranos",
            "Veterans Affairs file: the VA claim number for Sgt. Alvarez is 312-48-7765, \
             service number RA4815162 (US Army). Date of birth: 04/07/1961. \
             His DoD ID DOD-2718281828 was reissued in 2019.",
        ),
        (
            "Clínica",
            "Practice Tax ID (EIN) 47-1928374 is registered with the IRS for Bayview Clinic. \
             Attending physician license number MD448201; staff id EMP-20417 for the \
             front desk. Patient DOB 1987-11-23.",
        ),
        (
            "RH",
            "Payroll id HR-556677 belongs to a new hire born 29/02/1996. Legacy badge \
             codes like ab-1234 and OPS88412 still appear in old spreadsheets.",
        ),
        (
            "Armadilhas",
            "Claim number 987-65-4321 is a test value, 000000000 is a placeholder, \
             the ratio was 0.482913765 and the appointment is on 31/02/2000.",
        ),
    ]
}
