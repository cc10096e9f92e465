//! Signal analysis stages: spectral frontend, peak spreading and peak
//! recognition.

pub mod peaks;
pub mod spectral;
pub mod spreading;

pub use peaks::PeakRecognizer;
pub use spectral::SpectralFrontend;
pub use spreading::PeakSpreader;
