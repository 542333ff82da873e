mod edns_assembler;

pub use edns_assembler::EdnsAssembler;
