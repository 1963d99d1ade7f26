const DISTRICTS: &[(&str, [&str; 10])] = &[
    ("Punjab", ["Amritsar", "Ludhiana", "Patiala", "Jalandhar", "Bathinda", "Mohali", "Firozpur", "Sangrur", "Hoshiarpur", "Kapurthala"]),
    ("Haryana", ["Ambala", "Gurugram", "Faridabad", "Hisar", "Karnal", "Panipat", "Rohtak", "Sonipat", "Yamunanagar", "Sirsa"]),
    ("Uttar Pradesh", ["Lucknow", "Kanpur", "Ghaziabad", "Agra", "Varanasi", "Meerut", "Allahabad", "Bareilly", "Aligarh", "Moradabad"]),
    ("Madhya Pradesh", ["Bhopal", "Indore", "Jabalpur", "Gwalior", "Ujjain", "Sagar", "Dewas", "Satna", "Ratlam", "Rewa"]),
    ("Maharashtra", ["Mumbai", "Pune", "Nagpur", "Nashik", "Aurangabad", "Solapur", "Amravati", "Kolhapur", "Sangli", "Jalgaon"]),
    ("Karnataka", ["Bangalore", "Mysore", "Hubli", "Mangalore", "Belgaum", "Gulbarga", "Davangere", "Bellary", "Bijapur", "Shimoga"]),
    ("Tamil Nadu", ["Chennai", "Coimbatore", "Madurai", "Tiruchirappalli", "Salem", "Tirunelveli", "Erode", "Vellore", "Thanjavur", "Dindigul"]),
    ("Andhra Pradesh", ["Visakhapatnam", "Vijayawada", "Guntur", "Nellore", "Kurnool", "Rajahmundry", "Tirupati", "Kadapa", "Kakinada", "Anantapur"]),
    ("Gujarat", ["Ahmedabad", "Surat", "Vadodara", "Rajkot", "Bhavnagar", "Jamnagar", "Junagadh", "Gandhinagar", "Anand", "Mehsana"]),
    ("Rajasthan", ["Jaipur", "Jodhpur", "Kota", "Bikaner", "Udaipur", "Ajmer", "Bhilwara", "Alwar", "Bharatpur", "Sikar"]),
];

pub fn states() -> Vec<&'static str> {
    DISTRICTS.iter().map(|(state, _)| *state).collect()
}

/// Districts of a state by exact name; unknown states have none.
pub fn districts(state: &str) -> Vec<&'static str> {
    DISTRICTS
        .iter()
        .find(|(name, _)| *name == state)
        .map(|(_, d)| d.to_vec())
        .unwrap_or_default()
}
